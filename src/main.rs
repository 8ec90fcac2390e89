//! ics-crawler main entry point
//!
//! This is the command-line interface for the ics-crawler web crawler.

use anyhow::{Context, Result};
use clap::Parser;
use ics_crawler::analytics::Analytics;
use ics_crawler::config::{load_config_with_hash, Config};
use ics_crawler::crawler::{Crawler, HttpFetcher};
use ics_crawler::storage::{load_statistics, open_store, print_statistics};
use ics_crawler::CrawlerError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// ics-crawler: a polite, resumable crawler
///
/// Crawls a fixed set of university domains while avoiding crawler traps,
/// keeps its frontier on disk so a stopped crawl can resume, and reports
/// word frequencies, the longest page and pages per subdomain.
#[derive(Parser, Debug)]
#[command(name = "ics-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A polite, resumable web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH", default_value = "config.toml")]
    config_file: PathBuf,

    /// Delete the saved frontier and start again from the seed URLs
    #[arg(long)]
    restart: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "restart"])]
    dry_run: bool,

    /// Show statistics from the saved frontier and exit
    #[arg(long, conflicts_with_all = ["dry_run", "restart"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config_file.display());
    let (config, hash) = load_config_with_hash(&cli.config_file).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            cli.config_file.display()
        )
    })?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, cli.restart).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ics_crawler=info,warn"),
            1 => EnvFilter::new("ics_crawler=debug,info"),
            2 => EnvFilter::new("ics_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== ics-crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Threads: {}", config.crawler.threads_count);
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay);

    println!("\nUser Agent: {}", config.user_agent.name);

    println!("\nStorage:");
    println!("  Save file: {}", config.storage.save_file);

    println!("\nAnalytics:");
    println!("  Subdomain suffix: {}", config.analytics.domain_suffix);
    println!("  JSON report: {}", config.analytics.report_path);
    println!("  Text report: {}", config.analytics.text_report_path);
    println!("  Activity log: {}", config.analytics.log_path);

    println!("\nSeed URLs ({}):", config.crawler.seed_urls.len());
    for seed in &config.crawler.seed_urls {
        println!("  - {}", seed);
    }

    println!(
        "\nAllowed Domains ({}):",
        config.crawler.allowed_domains.len()
    );
    for domain in &config.crawler.allowed_domains {
        println!("  - {}", domain);
    }

    println!("\n✓ Configuration is valid");
    if Path::new(&config.storage.save_file).exists() {
        println!(
            "✓ Would resume from {} (pass --restart to start over)",
            config.storage.save_file
        );
    } else {
        println!(
            "✓ Would start crawling with {} seed URLs",
            config.crawler.seed_urls.len()
        );
    }
}

/// Handles the --stats mode: shows statistics from the saved frontier
fn handle_stats(config: &Config) -> Result<()> {
    let path = Path::new(&config.storage.save_file);
    println!("Save file: {}\n", path.display());

    if !path.exists() {
        anyhow::bail!("Save file {} does not exist", path.display());
    }

    let store = open_store(path)
        .with_context(|| format!("Failed to open save file {}", path.display()))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
///
/// The crawl runs on a blocking thread. A termination signal writes the
/// analytics reports and exits without waiting for in-flight downloads.
async fn handle_crawl(config: Config, restart: bool) -> Result<()> {
    if restart {
        tracing::info!("Starting fresh crawl (ignoring previous state)");
    } else {
        tracing::info!("Starting crawl (will resume from the save file if present)");
    }
    tracing::info!(
        "Seeds: {}, allowed domains: {}, workers: {}",
        config.crawler.seed_urls.len(),
        config.crawler.allowed_domains.len(),
        config.crawler.threads_count
    );

    let analytics = Arc::new(Analytics::new(&config.analytics));
    let save_file = config.storage.save_file.clone();

    let crawl_analytics = Arc::clone(&analytics);
    let crawl = tokio::task::spawn_blocking(move || -> ics_crawler::Result<()> {
        // the blocking client must be created off the async runtime
        let fetcher = HttpFetcher::new(&config.user_agent)?;
        let crawler =
            Crawler::from_config(&config, restart, Arc::new(fetcher), Some(crawl_analytics))?;
        crawler.start()
    });

    tokio::select! {
        joined = crawl => {
            let outcome = joined.context("Crawl task failed")?;
            analytics.flush().context("Failed to write analytics reports")?;

            match outcome {
                Ok(()) => {
                    tracing::info!("Crawl completed successfully");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("Crawl failed: {}", e);
                    Err(describe_crawl_error(e, &save_file))
                }
            }
        }
        signal = shutdown_signal() => {
            tracing::warn!("Received {}, writing reports and exiting", signal);
            if let Err(e) = analytics.flush() {
                tracing::error!("Failed to write analytics reports: {}", e);
                std::process::exit(1);
            }
            std::process::exit(0);
        }
    }
}

/// Adds a hint to errors a user can fix by starting over
fn describe_crawl_error(error: CrawlerError, save_file: &str) -> anyhow::Error {
    match error {
        CrawlerError::Storage(_) | CrawlerError::Frontier(_) => anyhow::Error::new(error)
            .context(format!(
                "Frontier store {} failed (check free space, or rerun with --restart to discard it)",
                save_file
            )),
        other => anyhow::Error::new(other),
    }
}

/// Waits for SIGINT or, on Unix, SIGTERM and returns its name
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT",
                _ = terminate.recv() => "SIGTERM",
            },
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {}", e);
                wait_for_ctrl_c().await
            }
        }
    }

    #[cfg(not(unix))]
    {
        wait_for_ctrl_c().await
    }
}

async fn wait_for_ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    "SIGINT"
}
