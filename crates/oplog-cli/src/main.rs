use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use oplog_cli::{Cli, Config, dispatch};
use oplog_core::SpentDate;

/// Picks the spent-on date: explicit flag first, then the filename
/// convention, then today.
fn resolve_date(cli_date: Option<&str>, path: &std::path::Path) -> Result<SpentDate> {
    if let Some(value) = cli_date {
        return SpentDate::parse(value).context("invalid --date");
    }
    Ok(SpentDate::from_file_name(path).unwrap_or_else(SpentDate::today))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let path = cli.file.unwrap_or_else(|| {
        PathBuf::from(format!("status_{}.dailystatus", SpentDate::today()))
    });
    let date = resolve_date(cli.date.as_deref(), &path)?;

    let file =
        File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
    let client = oplog_api::Client::new(&config.url, &config.key)?;

    let outcome = dispatch::run(
        BufReader::new(file),
        date,
        &config.activity,
        &client,
        config.max_in_flight,
    )
    .await?;

    tracing::info!(
        launched = outcome.launched,
        skipped = outcome.skipped,
        succeeded = outcome.succeeded,
        failed = outcome.failed,
        "run complete"
    );

    Ok(())
}
