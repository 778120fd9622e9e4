//! CLI argument definitions for levelrip

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "levelrip")]
#[command(about = "Extract the loaded level from a running game", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Attach to a running supported game and export its loaded level
    #[command(visible_alias = "x")]
    Extract {
        /// Root directory for exported maps (uses configured default if not provided)
        #[arg(short, long, env = "LEVELRIP_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Decimal places for written numbers
        #[arg(short, long)]
        precision: Option<usize>,
    },

    /// List supported game builds
    #[command(visible_alias = "p")]
    Profiles,

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Set default decimal precision
        #[arg(long)]
        precision: Option<usize>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
