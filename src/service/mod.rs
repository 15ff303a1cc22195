//! Word statistics service built on the aggregator.
//!
//! This module provides the coordinator and worker pool that fan a job out
//! and gather the per-word results.

pub mod stats;
pub mod worker;

pub use stats::{StatsService, StatsServiceConfig};
pub use worker::{WorkItem, WorkerConfig, WorkerPool};
