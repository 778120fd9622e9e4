//! Level extraction command
//!
//! Attaches to the running game, runs the extraction pipeline with
//! narration on stderr, and writes the scene files.

use crate::config::{Config, MAX_PRECISION};
use crate::memory::GameProcess;
use anyhow::{bail, Context, Result};
use levelrip::{Outcome, Scene};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Handle the extract command
///
/// Flags override the configured output root and precision.
pub fn handle(output_dir: Option<PathBuf>, precision: Option<usize>) -> Result<()> {
    let config = Config::load()?;
    let output_dir = output_dir.unwrap_or_else(|| config.output_dir());
    let precision = precision.unwrap_or_else(|| config.precision());
    if precision > MAX_PRECISION {
        bail!("Precision must be at most {}, got {}", MAX_PRECISION, precision);
    }

    let process = GameProcess::attach()?;
    tracing::info!("{}", process.info());

    let outcome = levelrip::extract(&process, process.profile, &mut |line: &str| eprintln!("{}", line))
        .with_context(|| format!("Failed to extract level from PID {}", process.pid))?;

    match outcome {
        Outcome::Extracted(scene) => export(&scene, &output_dir, precision),
        // Both were narrated by the pipeline
        Outcome::Unsupported(_) | Outcome::NoLevelLoaded => Ok(()),
    }
}

fn export(scene: &Scene, output_dir: &Path, precision: usize) -> Result<()> {
    eprintln!("Converting to OBJ....");
    let start = Instant::now();

    let paths = levelrip::write_scene(scene, output_dir, precision)
        .with_context(|| format!("Failed to write map files under {}", output_dir.display()))?;

    eprintln!(
        "Converted to OBJ in {:.2} seconds.",
        start.elapsed().as_secs_f64()
    );
    println!("{}", paths.dir.display());
    Ok(())
}
