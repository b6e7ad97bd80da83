mod cli;
mod error;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tickwatch_notifier::{daemon, AppConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Command::Run { config } => {
            let config = AppConfig::from_file(config)?;
            daemon::run(config).await?;
        }
        Command::Check { config } => {
            // from_file already validated every schedule.
            let config = AppConfig::from_file(config)?;
            print_schedule(&config);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_schedule(config: &AppConfig) {
    for instrument in &config.instruments {
        println!(
            "{} ({}) lookback {}d, reload {}, refresh [{}]",
            instrument.symbol,
            instrument.kind,
            instrument.lookback_days,
            instrument.reload_time,
            instrument.refresh_times.join(", "),
        );
    }
}
