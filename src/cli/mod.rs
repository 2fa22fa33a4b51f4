//! CLI interface for stocksim
//!
//! Provides subcommands for:
//! - `run`: Start the refresh and simulation engines
//! - `refresh`: Run one reconciliation pass and exit
//! - `config`: Show the loaded configuration

mod refresh;
mod run;

pub use refresh::RefreshArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "stocksim")]
#[command(about = "Market-data synchronization and price-simulation service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the background engines
    Run(RunArgs),
    /// Run one reconciliation pass and exit
    Refresh(RefreshArgs),
    /// Show the loaded configuration
    Config,
}
