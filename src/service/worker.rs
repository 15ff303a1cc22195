//! Worker pool that measures words.
//!
//! Each worker owns an inbox and a private cache of word lengths. Work is
//! handed out round-robin; a worker reports each length straight to the
//! aggregator handle that came with the word.

use crate::aggregator::AggregatorHandle;
use crate::error::ServiceError;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Settings for a worker pool.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of worker tasks.
    pub workers: usize,
    /// Artificial delay before each result, used to simulate slow workers.
    pub delay: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            delay: Duration::ZERO,
        }
    }
}

/// One word to measure and where to send the result.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub word: String,
    pub reply_to: AggregatorHandle,
}

/// Fixed set of worker tasks.
pub struct WorkerPool {
    inboxes: Vec<mpsc::UnboundedSender<WorkItem>>,
    tasks: Vec<JoinHandle<()>>,
    next: AtomicUsize,
}

impl WorkerPool {
    /// Spawns `config.workers` workers on the current tokio runtime.
    pub fn new(config: &WorkerConfig) -> Result<Self, ServiceError> {
        if config.workers == 0 {
            return Err(ServiceError::NoWorkers);
        }

        let mut inboxes = Vec::with_capacity(config.workers);
        let mut tasks = Vec::with_capacity(config.workers);

        for index in 0..config.workers {
            let (tx, rx) = mpsc::unbounded_channel();
            inboxes.push(tx);
            tasks.push(tokio::spawn(run_worker(index, rx, config.delay)));
        }

        debug!(
            "Started {} workers (delay {:?})",
            config.workers, config.delay
        );

        Ok(Self {
            inboxes,
            tasks,
            next: AtomicUsize::new(0),
        })
    }

    pub fn size(&self) -> usize {
        self.inboxes.len()
    }

    /// Hands `item` to the next worker in round-robin order.
    pub fn dispatch(&self, item: WorkItem) {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.inboxes.len();
        if self.inboxes[index].send(item).is_err() {
            warn!("Worker {} has stopped, word dropped", index);
        }
    }

    /// Closes every inbox and waits for the workers to drain.
    pub async fn shutdown(self) {
        drop(self.inboxes);
        for result in join_all(self.tasks).await {
            if let Err(e) = result {
                warn!("Worker task failed: {}", e);
            }
        }
    }
}

async fn run_worker(index: usize, mut inbox: mpsc::UnboundedReceiver<WorkItem>, delay: Duration) {
    let mut cache: HashMap<String, usize> = HashMap::new();

    while let Some(item) = inbox.recv().await {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let length = *cache
            .entry(item.word)
            .or_insert_with_key(|word| word.chars().count());

        trace!(worker = index, length, "Measured word");
        item.reply_to.submit(length as i64);
    }

    debug!("Worker {} stopped", index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{self, AggregationRequest};
    use crate::models::Outcome;
    use tokio::sync::oneshot;

    fn item(word: &str, reply_to: &AggregatorHandle) -> WorkItem {
        WorkItem {
            word: word.to_string(),
            reply_to: reply_to.clone(),
        }
    }

    #[test]
    fn test_worker_config_default() {
        let config = WorkerConfig::default();
        assert_eq!(config.workers, 4);
        assert!(config.delay.is_zero());
    }

    #[tokio::test]
    async fn test_zero_workers_rejected() {
        let config = WorkerConfig {
            workers: 0,
            ..WorkerConfig::default()
        };
        assert!(matches!(
            WorkerPool::new(&config),
            Err(ServiceError::NoWorkers)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_workers_report_character_counts() {
        let pool = WorkerPool::new(&WorkerConfig::default()).unwrap();
        assert_eq!(pool.size(), 4);

        let (tx, rx) = oneshot::channel();
        let (handle, _) = aggregator::spawn(AggregationRequest::new(3, tx).unwrap());

        pool.dispatch(item("héllo", &handle));
        pool.dispatch(item("ab", &handle));
        pool.dispatch(item("héllo", &handle));

        assert_eq!(rx.await.unwrap(), Outcome::Success { mean: 4.0 });
        pool.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_queued_work() {
        let pool = WorkerPool::new(&WorkerConfig {
            workers: 1,
            delay: Duration::from_millis(100),
        })
        .unwrap();

        let (tx, rx) = oneshot::channel();
        let (handle, _) = aggregator::spawn(AggregationRequest::new(2, tx).unwrap());
        pool.dispatch(item("one", &handle));
        pool.dispatch(item("three", &handle));
        pool.shutdown().await;

        assert_eq!(rx.await.unwrap(), Outcome::Success { mean: 4.0 });
    }
}
