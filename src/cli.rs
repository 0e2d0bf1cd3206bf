//! Command line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Static charts for energy-system model runs", long_about = None)]
pub struct Cli {
    /// Log level, used when RUST_LOG is not set
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate every chart enabled in the configuration
    Run {
        /// TOML configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Write figures below this folder instead of `output_root`
        #[arg(short, long)]
        output_root: Option<PathBuf>,
    },
    /// List the chart keys accepted under `[charts.<group>]`
    ListCharts,
}
