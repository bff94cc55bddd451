//! Config validation logic.
//! Verifies the source directory exists and is readable, creates the target
//! directory, probes writability, and rejects nested or identical paths.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use crate::errors::SortdError;

use super::types::Config;

impl Config {
    /// Validate the configured directories.
    ///
    /// - source_dir must exist, be a directory, and be readable; a missing
    ///   source is the start-time configuration error and maps to
    ///   [`SortdError::SourceDirMissing`].
    /// - target_dir is created if absent and must be writable.
    /// - The two must not be the same path or nest inside each other.
    pub fn validate(&self) -> Result<()> {
        let src = &self.source_dir;
        let dst = &self.target_dir;

        if !src.exists() {
            error!(code = "source_dir_missing", path = %src.display(), "source directory not found");
            return Err(SortdError::SourceDirMissing(src.clone()).into());
        }
        if !src.is_dir() {
            bail!("source_dir is not a directory: {}", src.display());
        }
        fs::read_dir(src).with_context(|| {
            format!("Cannot read source_dir '{}'; check permissions", src.display())
        })?;
        debug!("source_dir readable: {}", src.display());

        ensure_dir_is_or_create(dst, "target_dir")?;
        ensure_writable(dst, "target_dir")?;

        // Resolve symlinks and ensure the directories are disjoint: a target
        // inside the source would be re-observed by every sweep.
        let src_real = fs::canonicalize(src).unwrap_or_else(|_| src.clone());
        let dst_real = fs::canonicalize(dst).unwrap_or_else(|_| dst.clone());

        if src_real == dst_real {
            bail!(
                "source_dir and target_dir resolve to the same path: '{}'",
                src_real.display()
            );
        }
        if dst_real.starts_with(&src_real) {
            bail!(
                "target_dir '{}' must not be inside source_dir '{}'",
                dst_real.display(),
                src_real.display()
            );
        }
        if src_real.starts_with(&dst_real) {
            bail!(
                "source_dir '{}' must not be inside target_dir '{}'",
                src_real.display(),
                dst_real.display()
            );
        }

        info!(
            source = %src.display(),
            target = %dst.display(),
            "config validated"
        );
        Ok(())
    }
}

/// Ensure directory exists (create if missing). If it exists, it must be a directory.
fn ensure_dir_is_or_create(path: &Path, name: &str) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            bail!("{name} exists but isn't a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create {name} directory '{}'", path.display()))?;
        info!("Created {name} directory: {}", path.display());
    }
    Ok(())
}

/// Ensure directory is writable using a non-destructive probe file.
fn ensure_writable(path: &Path, name: &str) -> Result<()> {
    let probe = path.join(format!(".sortd_probe_{}.tmp", std::process::id()));
    match fs::OpenOptions::new().create_new(true).write(true).open(&probe) {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            debug!("{name} writable: {}", path.display());
            Ok(())
        }
        Err(e) => {
            bail!(
                "Cannot write to {name} '{}': {}. Check directory permissions.",
                path.display(),
                e
            )
        }
    }
}
