//! Error types for the library.
//!
//! Outcomes of an aggregation are never errors; these cover misuse at
//! construction time and failures of the surrounding service plumbing.

use thiserror::Error;

/// Errors returned when creating an aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregatorError {
    #[error("expected count must be at least 1, got {0}")]
    InvalidExpectedCount(usize),
}

/// Errors returned by the word statistics service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("job contains no words")]
    EmptyJob,

    #[error("worker pool needs at least one worker")]
    NoWorkers,

    #[error("aggregator stopped without replying")]
    ReplyDropped,

    #[error(transparent)]
    Aggregator(#[from] AggregatorError),
}
