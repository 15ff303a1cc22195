//! Sequential aggregation state.
//!
//! `Aggregation` holds no channels or timers. The task in `runner` feeds it
//! events one at a time and forwards whatever outcome it produces.

use crate::models::Outcome;
use std::num::NonZeroUsize;

/// Events an aggregator reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorEvent {
    /// One worker's measurement.
    PartialResult(i64),
    /// The fixed deadline has elapsed.
    DeadlineExpired,
}

/// Lifecycle phase of an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Collecting,
    Completed,
}

/// Results collected so far for one request.
#[derive(Debug)]
pub struct Aggregation {
    expected_count: NonZeroUsize,
    results: Vec<i64>,
    phase: Phase,
}

impl Aggregation {
    pub fn new(expected_count: NonZeroUsize) -> Self {
        Self {
            expected_count,
            results: Vec::with_capacity(expected_count.get()),
            phase: Phase::Collecting,
        }
    }

    /// Applies one event, returning the outcome if this event completed the
    /// aggregation. Events after completion are ignored.
    pub fn apply(&mut self, event: AggregatorEvent) -> Option<Outcome> {
        match event {
            AggregatorEvent::PartialResult(value) => self.on_partial_result(value),
            AggregatorEvent::DeadlineExpired => self.on_deadline_expired(),
        }
    }

    /// Records a partial result. Completes with the mean once
    /// `expected_count` results have arrived.
    pub fn on_partial_result(&mut self, value: i64) -> Option<Outcome> {
        if self.is_completed() {
            return None;
        }

        self.results.push(value);

        if self.results.len() == self.expected_count.get() {
            self.phase = Phase::Completed;
            Some(Outcome::Success {
                mean: mean(&self.results),
            })
        } else {
            None
        }
    }

    /// Fails the aggregation, discarding any partial progress.
    pub fn on_deadline_expired(&mut self) -> Option<Outcome> {
        if self.is_completed() {
            return None;
        }

        self.phase = Phase::Completed;
        Some(Outcome::unavailable())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    pub fn expected_count(&self) -> usize {
        self.expected_count.get()
    }

    /// Results in arrival order.
    pub fn results(&self) -> &[i64] {
        &self.results
    }
}

/// Mean in floating point. The sum is taken in `i128` so it cannot overflow.
fn mean(values: &[i64]) -> f64 {
    let sum: i128 = values.iter().map(|&v| i128::from(v)).sum();
    sum as f64 / values.len() as f64
}
