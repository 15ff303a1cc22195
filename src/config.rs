//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.statsgather.toml` files.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".statsgather.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Aggregator settings.
    #[serde(default)]
    pub aggregator: AggregatorConfig,

    /// Worker pool settings.
    #[serde(default)]
    pub service: ServiceConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Output format for the report.
    #[serde(default)]
    pub format: OutputFormat,
}

/// Aggregator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Time allowed for all partial results to arrive, in milliseconds.
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            deadline_ms: default_deadline_ms(),
        }
    }
}

fn default_deadline_ms() -> u64 {
    3000
}

/// Worker pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Number of worker tasks.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Artificial per-word delay in milliseconds.
    #[serde(default)]
    pub worker_delay_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            worker_delay_ms: 0,
        }
    }
}

fn default_workers() -> usize {
    4
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load `.statsgather.toml` from a directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Resolve the configuration to use.
    ///
    /// An explicit path must exist. Otherwise `.statsgather.toml` in `dir` is
    /// used if present, and defaults if not. A file that exists but fails to
    /// parse or validate is an error in both cases.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        Ok(Self::load_from_dir(dir)?.unwrap_or_default())
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if self.aggregator.deadline_ms == 0 {
            anyhow::bail!("aggregator.deadline_ms must be at least 1");
        }
        if self.service.workers == 0 {
            anyhow::bail!("service.workers must be at least 1");
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(deadline_ms) = args.deadline_ms {
            self.aggregator.deadline_ms = deadline_ms;
        }
        if let Some(workers) = args.workers {
            self.service.workers = workers;
        }
        if let Some(delay) = args.worker_delay_ms {
            self.service.worker_delay_ms = delay;
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    fn write_local(dir: &Path, contents: &str) {
        std::fs::write(dir.join(CONFIG_FILE_NAME), contents).unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.aggregator.deadline_ms, 3000);
        assert_eq!(config.service.workers, 4);
        assert_eq!(config.service.worker_delay_ms, 0);
        assert_eq!(config.general.format, OutputFormat::Text);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true
format = "json"

[aggregator]
deadline_ms = 500

[service]
workers = 8
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.aggregator.deadline_ms, 500);
        assert_eq!(config.service.workers, 8);
        assert_eq!(config.service.worker_delay_ms, 0);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[aggregator]"));
        assert!(toml_str.contains("[service]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.aggregator.deadline_ms, 3000);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        write_local(dir.path(), "[service]\nworkers = 2\n");
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.service.workers, 2);
    }

    #[test]
    fn test_discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::discover(None, dir.path()).unwrap();
        assert_eq!(config.service.workers, 4);
    }

    #[test]
    fn test_discover_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        write_local(dir.path(), "[service]\nworkers = 2\n");
        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "[service]\nworkers = 9\n").unwrap();

        let config = Config::discover(Some(&explicit), dir.path()).unwrap();
        assert_eq!(config.service.workers, 9);

        let missing = dir.path().join("missing.toml");
        assert!(Config::discover(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn test_discover_rejects_broken_local_file() {
        let dir = tempfile::tempdir().unwrap();
        write_local(dir.path(), "[service\nworkers = ");
        assert!(Config::discover(None, dir.path()).is_err());

        write_local(dir.path(), "[service]\nworkers = 0\n");
        let err = Config::discover(None, dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("workers"));
    }

    #[test]
    fn test_verbose_from_file() {
        let config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        let verbose = config.general.verbose;

        let args = Args::parse_from(["statsgather", "text"]);
        assert_eq!(args.log_level(verbose), tracing::Level::DEBUG);

        let quiet = Args::parse_from(["statsgather", "-q", "text"]);
        assert_eq!(quiet.log_level(verbose), tracing::Level::ERROR);
    }

    #[test]
    fn test_load_rejects_zero_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[aggregator]\ndeadline_ms = 0\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("deadline_ms"));
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.service.worker_delay_ms = 50;

        let args = Args::parse_from([
            "statsgather",
            "--workers",
            "2",
            "--deadline-ms",
            "750",
            "--format",
            "json",
            "some text",
        ]);
        config.merge_with_args(&args);

        assert_eq!(config.service.workers, 2);
        assert_eq!(config.aggregator.deadline_ms, 750);
        assert_eq!(config.general.format, OutputFormat::Json);
        // Not given on the command line, file value stays
        assert_eq!(config.service.worker_delay_ms, 50);
    }
}
