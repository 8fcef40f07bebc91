//! Timelog pusher CLI library.
//!
//! This crate provides the CLI interface for oplog.

mod cli;
mod config;
pub mod dispatch;

pub use cli::Cli;
pub use config::Config;
