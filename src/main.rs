//! Ad-Watcher main entry point
//!
//! This is the command-line interface for the Ad-Watcher classifieds watcher.

use ad_watcher::config::{load_config_with_hash, Config, SeenConfig};
use ad_watcher::Runner;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ad-Watcher: a classifieds search watcher
///
/// Ad-Watcher polls classifieds search pages and sends every newly posted
/// listing, with its photos and details, to Telegram chats.
#[derive(Parser, Debug)]
#[command(name = "ad-watcher")]
#[command(version = "1.0.0")]
#[command(about = "Watches classifieds searches and reports new listings", long_about = None)]
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

    /// Validate config and show what would be watched without scanning
    #[arg(long, conflicts_with = "once")]
    dry_run: bool,

    /// Run a single scan cycle, delivering everything currently listed, and exit
    #[arg(long, conflicts_with = "dry_run")]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let mut runner = Runner::from_config(&config).context("failed to set up watchers")?;
    tracing::info!(
        watches = config.watches.len(),
        scan_delay = config.scanner.scan_delay,
        "Watchers ready"
    );

    if cli.once {
        let report = runner.run_once().await;
        if report.failed_scans == report.scans && report.scans > 0 {
            anyhow::bail!("every scan failed");
        }
    } else {
        runner.run().await.context("watch loop failed")?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ad_watcher=info,warn"),
            1 => EnvFilter::new("ad_watcher=debug,info"),
            2 => EnvFilter::new("ad_watcher=trace,debug"),
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

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Ad-Watcher Dry Run ===\n");

    println!("Scanner:");
    println!("  Scan delay: {}s", config.scanner.scan_delay);
    println!("  Max listings per scan: {}", config.scanner.max_listings);
    println!("  Request timeout: {}s", config.scanner.request_timeout);
    println!("  Show new on start: {}", config.scanner.show_new_on_start);

    println!("\nSeen fingerprints:");
    match &config.seen {
        SeenConfig::Unbounded => println!("  Policy: unbounded"),
        SeenConfig::Recent { capacity } => println!("  Policy: recent ({} entries)", capacity),
        SeenConfig::Windowed { ttl_hours } => println!("  Policy: windowed ({}h)", ttl_hours),
    }

    println!("\nTelegram:");
    println!("  API base: {}", config.telegram.api_base);
    println!("  Bot: {}", bot_id(&config.telegram.token));

    println!("\nWatches ({}):", config.watches.len());
    for entry in &config.watches {
        println!("  - {} ({} chats)", entry.label(), entry.chats.len());
        println!("    * {}", entry.url);
    }

    println!("\n✓ Configuration is valid");
}

/// Returns the public bot id part of a token, hiding the secret
fn bot_id(token: &str) -> &str {
    token.split(':').next().unwrap_or_default()
}
