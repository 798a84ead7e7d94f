//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SubScout - Find the subscriptions hiding in your bank statements
#[derive(Parser)]
#[command(name = "subscout")]
#[command(about = "Detect recurring subscriptions from bank CSV exports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration override (TOML)
    ///
    /// Defaults to ~/.local/share/subscout/config/subscout.toml when present,
    /// otherwise the built-in tables are used.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect subscriptions in a statement
    Scan {
        /// Statement file to read
        #[arg(short, long)]
        file: PathBuf,

        /// Bank profile name (auto-detected if not specified)
        #[arg(short, long)]
        bank: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the transactions read from a statement
    Parse {
        /// Statement file to read
        #[arg(short, long)]
        file: PathBuf,

        /// Bank profile name (auto-detected if not specified)
        #[arg(short, long)]
        bank: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List configured bank profiles
    Profiles,

    /// List known services
    Services,
}
