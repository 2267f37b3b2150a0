//! Wellwatch main entry point
//!
//! This is the command-line interface for the wellwatch collection service.

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;
use wellwatch::api::{build_http_client, ApiClient};
use wellwatch::collector::HttpCollector;
use wellwatch::config::{load_config_with_hash, Config};
use wellwatch::crawler::Crawler;
use wellwatch::limiter::RateLimiter;
use wellwatch::pipeline::{load_lexicon, LexiconClassifier, Preprocessor};
use wellwatch::server::{build_app, serve};
use wellwatch::StatusManager;

/// Wellwatch: a social-platform content crawler with risk-signal inference
///
/// Wellwatch collects posts and comments from named communities, runs a
/// risk classifier over the text, and stores the results. Runs are driven
/// and observed over a small HTTP API.
#[derive(Parser, Debug)]
#[command(name = "wellwatch")]
#[command(version = "1.0.0")]
#[command(about = "A community content crawler with risk-signal inference", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would run without starting the server
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) =
        load_config_with_hash(&cli.config).context("Failed to load configuration")?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_serve(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wellwatch=info,warn"),
            1 => EnvFilter::new("wellwatch=debug,info"),
            2 => EnvFilter::new("wellwatch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config) {
    println!("=== Wellwatch Dry Run ===\n");

    println!("Platform API:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  Rate limit: {} calls/sec", config.api.rate_limit);
    println!("  Timeout: {}s", config.api.timeout_secs);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);
    println!("  Staging area: {}", config.storage.data_dir);

    println!("\nServer:");
    println!("  Listen address: {}", config.server.listen_addr);

    println!("\nPreprocessing:");
    println!("  Minimum text length: {}", config.preprocess.min_text_length);
    println!("  Lexicon: {}", config.preprocess.lexicon_path);
    println!("  Flag threshold: {}", config.preprocess.flag_threshold);

    println!("\nConfiguration is valid");
}

/// Wires the collaborators together and serves the HTTP API
async fn handle_serve(config: Config) -> anyhow::Result<()> {
    let limiter = Arc::new(RateLimiter::new(config.api.rate_limit));
    let http = build_http_client(config.api.timeout_secs)
        .context("Failed to build the HTTP client")?;
    let base_url = Url::parse(&config.api.base_url).context("Invalid base_url")?;
    let api = Arc::new(ApiClient::new(
        http,
        base_url,
        config.api.access_token.clone(),
        limiter,
    ));
    let collector = Arc::new(HttpCollector::new(api));

    let lexicon = load_lexicon(Path::new(&config.preprocess.lexicon_path))
        .context("Failed to load the risk lexicon")?;
    tracing::info!("Loaded {} lexicon term(s)", lexicon.len());
    let preprocessor = Preprocessor::new(config.preprocess.min_text_length, lexicon);
    let classifier = Arc::new(LexiconClassifier::new(config.preprocess.flag_threshold));

    let status = Arc::new(StatusManager::new());
    let crawler = Crawler::new(
        collector,
        classifier,
        Arc::clone(&status),
        Path::new(&config.storage.database_path),
        PathBuf::from(&config.storage.data_dir),
        preprocessor,
    )
    .context("Failed to initialize the pipeline")?;

    let app = build_app(Arc::new(crawler), status);
    let addr: SocketAddr = config
        .server
        .listen_addr
        .parse()
        .context("Invalid listen_addr")?;

    serve(app, addr).await.context("Server error")?;
    Ok(())
}
