//! Scatter-gather aggregator with a bounded wait.
//!
//! An aggregator collects a fixed number of integer partial results and
//! replies once with their mean. If the results have not all arrived when
//! the deadline elapses it replies with a failure instead. Either way it
//! replies exactly once and then stops.
//!
//! ```no_run
//! # async fn demo() -> Result<(), statsgather::error::AggregatorError> {
//! use statsgather::aggregator::{self, AggregationRequest};
//! use tokio::sync::oneshot;
//!
//! let (tx, rx) = oneshot::channel();
//! let (handle, _task) = aggregator::spawn(AggregationRequest::new(2, tx)?);
//! handle.submit(3);
//! handle.submit(5);
//! assert_eq!(rx.await.unwrap().mean(), Some(4.0));
//! # Ok(())
//! # }
//! ```

pub mod reply;
pub mod runner;
pub mod state;

pub use reply::ReplyTarget;
pub use runner::{spawn, AggregatorHandle};
pub use state::{Aggregation, AggregatorEvent, Phase};

use crate::error::AggregatorError;
use std::num::NonZeroUsize;
use std::time::Duration;

/// Deadline used when a request does not set one.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(3);

/// Parameters of one aggregation, fixed at creation.
#[derive(Debug)]
pub struct AggregationRequest<R> {
    pub(crate) expected_count: NonZeroUsize,
    pub(crate) deadline: Duration,
    pub(crate) reply_to: R,
}

impl<R: ReplyTarget> AggregationRequest<R> {
    /// Creates a request for `expected_count` results with the default
    /// deadline. Rejects an expected count of zero.
    pub fn new(expected_count: usize, reply_to: R) -> Result<Self, AggregatorError> {
        let count = NonZeroUsize::new(expected_count)
            .ok_or(AggregatorError::InvalidExpectedCount(expected_count))?;

        Ok(Self {
            expected_count: count,
            deadline: DEFAULT_DEADLINE,
            reply_to,
        })
    }

    /// Replaces the deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn expected_count(&self) -> usize {
        self.expected_count.get()
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Outcome;
    use tokio::sync::oneshot;

    #[test]
    fn test_zero_expected_count_rejected() {
        let (tx, _rx) = oneshot::channel::<Outcome>();
        let err = AggregationRequest::new(0, tx).unwrap_err();
        assert_eq!(err, AggregatorError::InvalidExpectedCount(0));
    }

    #[test]
    fn test_request_defaults() {
        let (tx, _rx) = oneshot::channel::<Outcome>();
        let request = AggregationRequest::new(4, tx).unwrap();
        assert_eq!(request.expected_count(), 4);
        assert_eq!(request.deadline(), Duration::from_secs(3));

        let request = request.with_deadline(Duration::from_millis(250));
        assert_eq!(request.deadline(), Duration::from_millis(250));
    }
}
