//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Push timelog updates to OpenProject.
///
/// Reads a daily status file of `<work-package> <hours> <description>` lines
/// and submits one time entry per line, concurrently.
#[derive(Debug, Parser)]
#[command(name = "oplog", version, about, long_about = None)]
pub struct Cli {
    /// Timelog file to read. Defaults to today's status_YYYYMMDD.dailystatus.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Date to log entries against, as YYYYMMDD. Defaults to the date in the
    /// filename, falling back to today.
    #[arg(short, long)]
    pub date: Option<String>,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}
