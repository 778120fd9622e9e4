//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up levelrip CLI defaults.

use crate::config::{Config, MAX_PRECISION};
use anyhow::{bail, Result};
use std::path::PathBuf;

/// Handle the configure command
///
/// # Arguments
/// * `output_dir` - Optional default output root
/// * `precision` - Optional default decimal precision
/// * `show` - If true, show current configuration
pub fn handle(output_dir: Option<PathBuf>, precision: Option<usize>, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if output_dir.is_none() && precision.is_none() {
        show_usage();
        return Ok(());
    }

    apply(&mut config, output_dir, precision)?;
    let path = config.save()?;

    println!("Output directory: {}", config.output_dir().display());
    println!("Precision: {}", config.precision());
    println!("Config saved to: {}", path.display());

    Ok(())
}

fn apply(config: &mut Config, output_dir: Option<PathBuf>, precision: Option<usize>) -> Result<()> {
    if let Some(p) = precision {
        if p > MAX_PRECISION {
            bail!("Precision must be at most {}, got {}", MAX_PRECISION, p);
        }
        config.precision = Some(p);
    }
    if let Some(dir) = output_dir {
        config.output_dir = Some(dir);
    }
    Ok(())
}

/// Display current configuration
fn show_config(config: &Config) {
    println!("Output directory: {}", config.output_dir().display());
    println!("Precision: {}", config.precision());

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: levelrip configure --output-dir DIR --precision N");
    println!("   or: levelrip configure --show");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_sets_values() {
        let mut config = Config::default();
        apply(&mut config, Some(PathBuf::from("maps")), Some(6)).unwrap();
        assert_eq!(config.output_dir(), PathBuf::from("maps"));
        assert_eq!(config.precision(), 6);
    }

    #[test]
    fn test_apply_keeps_unset_values() {
        let mut config = Config {
            output_dir: Some(PathBuf::from("maps")),
            precision: Some(2),
        };
        apply(&mut config, None, Some(3)).unwrap();
        assert_eq!(config.output_dir(), PathBuf::from("maps"));
        assert_eq!(config.precision(), 3);
    }

    #[test]
    fn test_apply_rejects_huge_precision() {
        let mut config = Config::default();
        assert!(apply(&mut config, None, Some(40)).is_err());
        assert_eq!(config.precision, None);
    }

    #[test]
    fn test_config_path_exists() {
        assert!(Config::config_path().is_ok());
    }
}
