//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tickwatch - KDJ market alert notifier
///
/// Watches configured instruments, recomputes the KDJ stochastic oscillator
/// on every scheduled intraday refresh, and pushes a formatted alert through
/// the notification channel.
#[derive(Debug, Parser)]
#[command(name = "tickwatch", version, about = "KDJ market alert notifier")]
pub struct Cli {
    /// Log filter, e.g. `info` or `tickwatch_notifier=debug`.
    #[arg(long, global = true, default_value = "info")]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the notifier daemon until stopped.
    Run {
        /// Path to the JSON configuration file.
        #[arg(long, value_name = "PATH")]
        config: PathBuf,
    },
    /// Validate a configuration file and print the resolved schedule.
    Check {
        /// Path to the JSON configuration file.
        #[arg(long, value_name = "PATH")]
        config: PathBuf,
    },
}
