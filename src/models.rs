//! Data models shared by the aggregator and the statistics service.
//!
//! This module contains the outcome type delivered to reply targets and the
//! report structures produced by the command-line front end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason attached to every deadline failure.
pub const SERVICE_UNAVAILABLE: &str = "Service unavailable, try again later";

/// Terminal result of one aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// All expected partial results arrived; `mean` is their average.
    Success { mean: f64 },
    /// The deadline elapsed first.
    Failure { reason: String },
}

impl Outcome {
    /// Creates the failure reported when the deadline elapses.
    pub fn unavailable() -> Self {
        Outcome::Failure {
            reason: SERVICE_UNAVAILABLE.to_string(),
        }
    }

    /// Returns true for `Outcome::Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Returns the mean for a successful outcome.
    pub fn mean(&self) -> Option<f64> {
        match self {
            Outcome::Success { mean } => Some(*mean),
            Outcome::Failure { .. } => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success { mean } => write!(f, "mean {:.3}", mean),
            Outcome::Failure { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// A word statistics job: text to split into words and measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsJob {
    pub text: String,
}

impl StatsJob {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Words of the job, split on whitespace.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }

    /// Number of words, which is the number of partial results to collect.
    pub fn word_count(&self) -> usize {
        self.words().count()
    }

    /// Returns true if the job contains no words.
    pub fn is_empty(&self) -> bool {
        self.words().next().is_none()
    }
}

/// Everything the front end reports about a finished job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    /// Text that was analyzed.
    pub text: String,
    /// Number of words fanned out to workers.
    pub word_count: usize,
    /// Terminal outcome of the aggregation.
    pub outcome: Outcome,
    /// When the outcome was received.
    pub completed_at: DateTime<Utc>,
    /// Wall-clock time from submission to outcome, in seconds.
    pub duration_seconds: f64,
}

impl StatsReport {
    pub fn new(job: &StatsJob, outcome: Outcome, duration_seconds: f64) -> Self {
        Self {
            text: job.text.clone(),
            word_count: job.word_count(),
            outcome,
            completed_at: Utc::now(),
            duration_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_reason() {
        let outcome = Outcome::unavailable();
        assert!(!outcome.is_success());
        assert_eq!(
            outcome,
            Outcome::Failure {
                reason: "Service unavailable, try again later".to_string()
            }
        );
        assert_eq!(outcome.mean(), None);
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let json = serde_json::to_string(&Outcome::Success { mean: 6.0 }).unwrap();
        assert_eq!(json, r#"{"status":"success","mean":6.0}"#);

        let parsed: Outcome =
            serde_json::from_str(r#"{"status":"failure","reason":"nope"}"#).unwrap();
        assert_eq!(
            parsed,
            Outcome::Failure {
                reason: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_job_words() {
        let job = StatsJob::new("  this is   the text ");
        assert_eq!(
            job.words().collect::<Vec<_>>(),
            vec!["this", "is", "the", "text"]
        );
        assert_eq!(job.word_count(), 4);
        assert!(!job.is_empty());
        assert!(StatsJob::new(" \t\n").is_empty());
    }

    #[test]
    fn test_report_from_job() {
        let job = StatsJob::new("a bb ccc");
        let report = StatsReport::new(&job, Outcome::Success { mean: 2.0 }, 0.01);
        assert_eq!(report.word_count, 3);
        assert_eq!(report.outcome.mean(), Some(2.0));
    }
}
