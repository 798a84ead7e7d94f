//! SubScout CLI - Subscription detector for bank statements
//!
//! Usage:
//!   subscout scan --file CSV     Detect subscriptions (auto-detects bank format)
//!   subscout parse --file CSV    Show parsed transactions
//!   subscout profiles            List bank profiles
//!   subscout services            List known services

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Scan { file, bank, json } => {
            commands::cmd_scan(config, &file, bank.as_deref(), json)
        }
        Commands::Parse { file, bank, json } => {
            commands::cmd_parse(config, &file, bank.as_deref(), json)
        }
        Commands::Profiles => commands::cmd_profiles(config),
        Commands::Services => commands::cmd_services(config),
    }
}
