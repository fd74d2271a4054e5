//! TweetCompare - #Trump vs. #Biden tweet activity analysis
//!
//! A CLI tool that loads two election tweet datasets, counts tweets per day
//! and per US state, and runs a paired t-test on the per-state counts.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any failure (bad arguments, unreadable data, failed test)

mod analysis;
mod cli;
mod config;
mod ingest;
mod models;
mod pipeline;
mod report;
mod sentiment;
mod text;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use report::ReportSink;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
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

    // Initialize logging
    init_logging(&args);

    info!("TweetCompare v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    if !args.runs_pipeline() {
        debug!("One-shot mode, dataset pipeline skipped");
    }

    let outcome = if let Some(ref text) = args.clean {
        handle_clean(text)
    } else if let Some(ref text) = args.analyze {
        handle_analyze(text)
    } else {
        run_comparison(&args)
    };

    if let Err(e) = outcome {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .tweetcompare.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to point at your datasets and adjust the filters.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so stdout stays reserved for the report.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Handle --clean: print the cleaned text.
fn handle_clean(text: &str) -> Result<()> {
    println!("{}", text::clean_text(text));
    Ok(())
}

/// Handle --analyze: print polarity and label.
fn handle_analyze(text: &str) -> Result<()> {
    let result = sentiment::analyze(text).context("Sentiment analysis failed")?;
    println!("{} ({})", result.polarity, result.label);
    Ok(())
}

/// Run the dataset pipeline and print its summary.
fn run_comparison(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(args)?;
    config.merge_with_args(args);
    debug!("Effective config: {:?}", config);

    let mut sink = ReportSink::stdout();
    let outcome = pipeline::run(&config, &mut sink).context("Pipeline failed")?;
    sink.flush().context("Failed to flush report output")?;

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&outcome)?,
        OutputFormat::Text => report::generate_text_report(&outcome),
    };
    println!("{}", output);

    info!(
        "Compared {} tweets in {:.1}s",
        outcome.stages.in_regions,
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Load configuration from file or use defaults.
///
/// An explicit `--config` must load; a broken default file is also an error.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default()? {
        Some(config) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
