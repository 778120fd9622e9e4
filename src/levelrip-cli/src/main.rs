mod cli;
mod commands;
mod config;
mod memory;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            output_dir,
            precision,
        } => {
            commands::extract::handle(output_dir, precision)?;
        }

        Commands::Profiles => {
            commands::profiles::handle();
        }

        Commands::Configure {
            output_dir,
            precision,
            show,
        } => {
            commands::configure::handle(output_dir, precision, show)?;
        }
    }

    Ok(())
}
