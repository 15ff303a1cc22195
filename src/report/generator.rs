//! Report generation.
//!
//! Renders a `StatsReport` as plain text for the terminal or as JSON.

use crate::models::{Outcome, StatsReport};
use anyhow::Result;

/// Generate a plain text report.
pub fn generate_text_report(report: &StatsReport) -> String {
    let mut output = String::new();

    output.push_str("Word Statistics\n");
    output.push_str("===============\n\n");
    output.push_str(&format!("Text:      {}\n", preview(&report.text, 60)));
    output.push_str(&format!("Words:     {}\n", report.word_count));
    output.push_str(&generate_outcome_section(&report.outcome));
    output.push_str(&format!(
        "Completed: {}\n",
        report.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("Duration:  {:.3}s\n", report.duration_seconds));

    output
}

fn generate_outcome_section(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Success { mean } => format!("Mean word length: {:.3}\n", mean),
        Outcome::Failure { reason } => format!("Job failed: {}\n", reason),
    }
}

/// Shortens long text to `max_chars` characters with a trailing ellipsis.
fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max_chars).collect();
        short.push('…');
        short
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &StatsReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
