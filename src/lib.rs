//! statsgather - scatter-gather aggregation with a bounded wait.
//!
//! The [`aggregator`] module is the core: a per-request task that collects
//! a fixed number of partial results or gives up at a fixed deadline, and
//! replies exactly once. The [`service`] module drives it with a worker
//! pool that measures word lengths.

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod service;
