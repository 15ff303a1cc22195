//! statsgather - mean word length via scatter-gather with a deadline.
//!
//! Exit codes:
//!   0 - Job completed with a mean
//!   1 - Runtime error (invalid arguments, config, etc.)
//!   2 - Job failed because the deadline elapsed

use anyhow::{Context, Result};
use statsgather::cli::{self, Args, OutputFormat};
use statsgather::config::{Config, CONFIG_FILE_NAME};
use statsgather::models::{StatsJob, StatsReport};
use statsgather::report;
use statsgather::service::{StatsService, StatsServiceConfig};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Configuration decides the log level, so it is resolved first
    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("statsgather v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    match run_job(&args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Job failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .statsgather.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging. `RUST_LOG` directives override the verbosity level.
fn init_logging(level: tracing::Level) {
    let rust_log = std::env::var("RUST_LOG").ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(cli::log_filter(level, rust_log.as_deref()))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the config file (explicit path or `.statsgather.toml`) and apply
/// command-line overrides.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = Config::discover(args.config.as_deref(), Path::new("."))?;
    config.merge_with_args(args);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Run one job end to end. Returns exit code (0 or 2).
async fn run_job(args: &Args, config: Config) -> Result<i32> {
    let job = StatsJob::new(args.text());
    let service = StatsService::new(StatsServiceConfig::from(&config))?;

    let start = Instant::now();
    let outcome = service.submit(&job).await?;
    let duration = start.elapsed().as_secs_f64();
    service.shutdown().await;

    let success = outcome.is_success();
    let stats_report = StatsReport::new(&job, outcome, duration);

    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&stats_report)?,
        OutputFormat::Text => report::generate_text_report(&stats_report),
    };
    println!("{}", output);

    if success {
        Ok(0)
    } else {
        warn!("Deadline elapsed before all words were measured");
        Ok(2)
    }
}
