//! Typed error definitions for sortd.
//! A small set of well-known failure modes so logs and tests can match on
//! stable codes instead of message text.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SortdError {
    #[error("Source directory not found: {0}")]
    SourceDirMissing(PathBuf),

    #[error("Failed to move '{path}' into '{category}' after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        path: PathBuf,
        category: &'static str,
        attempts: u32,
        last_error: String,
    },

    #[error("Filesystem watch failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("Service is running; stop it before reconfiguring")]
    ReconfigureWhileRunning,
}

impl SortdError {
    /// Stable short code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            SortdError::SourceDirMissing(_) => "source_dir_missing",
            SortdError::RetriesExhausted { .. } => "retries_exhausted",
            SortdError::Watch(_) => "watch_failed",
            SortdError::ReconfigureWhileRunning => "reconfigure_while_running",
        }
    }
}
