//! Solv Crawler main entry point
//!
//! Runs the HTTP crawl service, or a single crawl from the command line.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use solv_crawler::config::{load_settings_with_hash, CrawlConfig, Settings};
use solv_crawler::crawler::{run_crawl_with_cancel, HttpFetcher, PageFetcher, SessionCredential};
use solv_crawler::output::{print_statistics, records_to_json};
use solv_crawler::service::{self, AppState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Solv Crawler: a best-first deep crawler behind a small HTTP API
#[derive(Parser, Debug)]
#[command(name = "solv-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A best-first deep web crawler service", long_about = None)]
struct Cli {
    /// Path to TOML settings file (defaults apply if it does not exist)
    #[arg(short, long, value_name = "CONFIG", default_value = "solv-crawler.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default)
    Serve {
        /// Override the configured listen host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Crawl a single seed URL and print the records as JSON
    Crawl(CrawlArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Seed URL
    url: String,

    /// Deepest level to fetch (the seed is depth 0)
    #[arg(long, default_value_t = 1)]
    max_depth: u32,

    /// Mean delay between requests in seconds
    #[arg(long)]
    delay: Option<f64>,

    /// Number of concurrent fetch workers
    #[arg(long)]
    concurrency: Option<usize>,

    /// Keyword for relevance ordering (repeatable)
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,

    /// Stop after recording this many pages
    #[arg(long)]
    max_pages: Option<usize>,

    /// Print statistics to stdout instead of the records
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading settings from: {}", cli.config.display());
    let (mut settings, hash) = load_settings_with_hash(&cli.config)
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;
    match hash {
        Some(hash) => tracing::info!("Settings loaded successfully (hash: {})", hash),
        None => tracing::info!("Using default settings"),
    }

    let fetcher: Arc<dyn PageFetcher> = Arc::new(
        HttpFetcher::from_settings(&settings.crawler).context("Failed to build HTTP client")?,
    );

    match cli.command {
        Some(Command::Crawl(args)) => handle_crawl(settings, fetcher, args).await,
        Some(Command::Serve { host, port }) => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            handle_serve(settings, fetcher).await
        }
        None => handle_serve(settings, fetcher).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("solv_crawler=info,tower_http=info,warn"),
            1 => EnvFilter::new("solv_crawler=debug,tower_http=debug,info"),
            2 => EnvFilter::new("solv_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Cancels `token` on Ctrl+C
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, shutting down");
            token.cancel();
        }
    });
}

/// Handles the serve mode
async fn handle_serve(settings: Settings, fetcher: Arc<dyn PageFetcher>) -> anyhow::Result<()> {
    let state = AppState::from_settings(settings, fetcher)
        .context("Failed to load session state")?;
    cancel_on_ctrl_c(state.shutdown.clone());

    service::serve(state).await.context("Server failed")?;
    Ok(())
}

/// Handles the crawl mode
async fn handle_crawl(
    settings: Settings,
    fetcher: Arc<dyn PageFetcher>,
    args: CrawlArgs,
) -> anyhow::Result<()> {
    let defaults = &settings.crawler;

    let session = match defaults.storage_state.trim() {
        "" => None,
        path => Some(SessionCredential::from_file(Path::new(path))?),
    };

    let mut config = CrawlConfig::from_settings(defaults, args.url.clone())
        .with_max_depth(args.max_depth)
        .with_delay(
            args.delay.unwrap_or(defaults.default_delay),
            defaults.jitter_fraction,
        )
        .with_session_credential(session);

    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if !args.keywords.is_empty() {
        config = config.with_keywords(args.keywords.clone());
    }
    if args.max_pages.is_some() {
        config = config.with_max_pages(args.max_pages);
    }

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let report = run_crawl_with_cancel(config, fetcher, cancel)
        .await
        .with_context(|| format!("Crawl of {} failed", args.url))?;

    if args.stats {
        print_statistics(&report.stats);
    } else {
        println!("{}", records_to_json(&report.sorted_records())?);
    }

    Ok(())
}
