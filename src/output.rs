//! Output directory writer
//!
//! Rendered scripts land in one flat directory, one file per script. Any
//! `.sql` file left over from an earlier run is removed first so the
//! directory always reflects exactly one plan.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::renderer::RenderOutcome;

/// Remove previously generated `.sql` files; other files are left alone
pub fn clear_generated(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            fs::remove_file(&path).with_context(|| format!("Failed to remove {:?}", path))?;
            removed += 1;
        }
    }

    debug!("Removed {} old scripts from {:?}", removed, dir);
    Ok(removed)
}

/// Write every script in `scripts` to `dir`, in map order
pub fn write_scripts(dir: &Path, scripts: &IndexMap<String, String>) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    clear_generated(dir)?;

    let mut written = Vec::with_capacity(scripts.len());
    for (name, text) in scripts {
        let path = dir.join(name);
        fs::write(&path, text).with_context(|| format!("Failed to write {:?}", path))?;
        written.push(path);
    }

    info!("Wrote {} scripts to {:?}", written.len(), dir);
    Ok(written)
}

/// Write what a render run produced, even when it stopped early.
///
/// The run's own error is logged before anything touches the disk, and a
/// write failure carries it as context so neither is lost.
pub fn write_outcome(
    dir: &Path,
    outcome: &RenderOutcome,
    include_comments: bool,
) -> Result<Vec<PathBuf>> {
    if let Some(err) = &outcome.error {
        error!(
            "Run stopped early: {}; writing the {} scripts rendered so far",
            err,
            outcome.scripts.len()
        );
    }

    let written = write_scripts(dir, outcome.scripts.select(include_comments));
    match &outcome.error {
        Some(err) => written.with_context(|| format!("Writing output after a failed run ({})", err)),
        None => written,
    }
}
