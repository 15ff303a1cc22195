//! Word statistics service.
//!
//! Splits a job's text into words, creates one aggregator expecting one
//! result per word, and fans the words out to the worker pool. The mean
//! word length (or the timeout failure) comes back on a oneshot channel.

use super::worker::{WorkItem, WorkerConfig, WorkerPool};
use crate::aggregator::{self, AggregationRequest, DEFAULT_DEADLINE};
use crate::error::ServiceError;
use crate::models::{Outcome, StatsJob};
use futures::future::join_all;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// Configuration for the statistics service.
#[derive(Debug, Clone)]
pub struct StatsServiceConfig {
    pub workers: WorkerConfig,
    /// Deadline given to every aggregation.
    pub deadline: Duration,
}

impl Default for StatsServiceConfig {
    fn default() -> Self {
        Self {
            workers: WorkerConfig::default(),
            deadline: DEFAULT_DEADLINE,
        }
    }
}

impl From<&crate::config::Config> for StatsServiceConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            workers: WorkerConfig {
                workers: config.service.workers,
                delay: Duration::from_millis(config.service.worker_delay_ms),
            },
            deadline: Duration::from_millis(config.aggregator.deadline_ms),
        }
    }
}

/// Coordinator that runs word statistics jobs.
pub struct StatsService {
    pool: WorkerPool,
    deadline: Duration,
}

impl StatsService {
    /// Starts the worker pool. Must be called inside a tokio runtime.
    pub fn new(config: StatsServiceConfig) -> Result<Self, ServiceError> {
        let pool = WorkerPool::new(&config.workers)?;
        info!(
            "Stats service ready with {} workers, deadline {:?}",
            pool.size(),
            config.deadline
        );

        Ok(Self {
            pool,
            deadline: config.deadline,
        })
    }

    /// Runs one job and waits for its outcome.
    pub async fn submit(&self, job: &StatsJob) -> Result<Outcome, ServiceError> {
        if job.is_empty() {
            return Err(ServiceError::EmptyJob);
        }

        let (tx, rx) = oneshot::channel();
        let request = AggregationRequest::new(job.word_count(), tx)?.with_deadline(self.deadline);
        let (handle, _task) = aggregator::spawn(request);

        debug!(
            "Dispatching {} words to aggregator {}",
            job.word_count(),
            handle.id()
        );

        for word in job.words() {
            self.pool.dispatch(WorkItem {
                word: word.to_string(),
                reply_to: handle.clone(),
            });
        }
        drop(handle);

        rx.await.map_err(|_| ServiceError::ReplyDropped)
    }

    /// Runs several jobs concurrently. Results are in job order.
    pub async fn submit_all(&self, jobs: &[StatsJob]) -> Vec<Result<Outcome, ServiceError>> {
        join_all(jobs.iter().map(|job| self.submit(job))).await
    }

    /// Stops the worker pool.
    pub async fn shutdown(self) {
        self.pool.shutdown().await;
    }
}
