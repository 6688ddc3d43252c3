use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use relsentry::{Config, GitHubClient, ReleaseOutcome, StateStore, SyncEngine, SyncSummary};

#[derive(Parser)]
#[command(name = "relsentry")]
#[command(about = "Print latest version of your favorite projects")]
#[command(version)]
struct Cli {
    /// GitHub account whose starred repositories are checked (defaults to the configured account)
    #[arg(short, long)]
    account: Option<String>,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Release baseline file (defaults to the configured state path)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config)?;
    init_logging(cli.verbose, &config.logging.level);
    info!("Starting RelSentry v{}", env!("CARGO_PKG_VERSION"));

    let account = cli.account.unwrap_or_else(|| config.github.account.clone());
    let state_path = cli.state_file.unwrap_or_else(|| config.state_path());

    let client = GitHubClient::new(&config.github).context("Failed to create GitHub client")?;
    let engine = SyncEngine::new(client, StateStore::new(state_path));

    let summary = engine
        .run(&account)
        .await
        .with_context(|| format!("Release check for {} failed", account))?;

    print_summary(&summary);
    Ok(())
}

/// Initialize logging, `RUST_LOG` takes precedence over the configured level
fn init_logging(verbose: bool, level: &str) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Load configuration from specified path or default location
fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(&path),
        None => Config::load_or_default(),
    }
}

fn print_summary(summary: &SyncSummary) {
    for report in summary.changed() {
        if let ReleaseOutcome::Changed { previous, release } = &report.outcome {
            let previous = if previous.is_empty() {
                "(none)"
            } else {
                previous.as_str()
            };
            println!();
            println!(
                "{}: {} (previous {})",
                report.full_name, release.tag_name, previous
            );
            println!("{}", release.html_url);
            println!("------------------");
            println!("{}", release.body.as_deref().unwrap_or_default());
            println!("------------------");
        }
    }

    println!();
    println!(
        "Checked {} starred projects of {}: {} changed, {} unchanged, {} without releases",
        summary.total(),
        summary.account,
        summary.changed_count(),
        summary.unchanged_count(),
        summary.no_release_count()
    );
}
