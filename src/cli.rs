//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// statsgather - mean word length via scatter-gather with a deadline
///
/// Splits TEXT into words, fans them out to a pool of workers, and
/// gathers the word lengths into one mean. If the workers do not all
/// answer before the deadline the job fails.
///
/// Examples:
///   statsgather "this is the text that will be analyzed"
///   statsgather --workers 8 --format json "some text"
///   statsgather --worker-delay-ms 5000 "too slow to finish"
///   statsgather --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Text to analyze
    #[arg(value_name = "TEXT", required_unless_present = "init_config")]
    pub text: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .statsgather.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Number of worker tasks
    #[arg(long, value_name = "NUM", env = "STATSGATHER_WORKERS")]
    pub workers: Option<usize>,

    /// Deadline for each job in milliseconds
    ///
    /// Fixed from the moment the job starts; arriving results do not
    /// extend it. Default: from config or 3000.
    #[arg(long, value_name = "MS", env = "STATSGATHER_DEADLINE_MS")]
    pub deadline_ms: Option<u64>,

    /// Artificial delay per word in milliseconds
    ///
    /// Simulates slow workers; set it above the deadline to see the
    /// failure path.
    #[arg(long, value_name = "MS")]
    pub worker_delay_ms: Option<u64>,

    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Generate a default .statsgather.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the text to analyze, empty if not set (should be validated first).
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.text().split_whitespace().next().is_none() {
            return Err("Text must contain at least one word".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.workers == Some(0) {
            return Err("Workers must be at least 1".to_string());
        }

        if self.deadline_ms == Some(0) {
            return Err("Deadline must be at least 1 millisecond".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general] verbose` from the config file;
    /// `--quiet` wins over both.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Builds the log filter. Directives from `rust_log` (the `RUST_LOG`
/// value) take precedence; otherwise everything at `level` and above is shown.
pub fn log_filter(level: tracing::Level, rust_log: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(rust_log.unwrap_or_default())
}
