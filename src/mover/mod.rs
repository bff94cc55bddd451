//! Single categorized relocation with retry and conflict handling.
//! Attempts an atomic rename into `target_dir/<category>/`; on cross-device
//! failure falls back to copy+remove. A destination already holding the same
//! bytes is treated as a partially completed earlier move: the leftover
//! source is deleted and the move reported as done.

mod helpers;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::category::classify;
use crate::config::Config;
use crate::errors::SortdError;
use crate::shutdown;

use helpers::{io_error_with_help, same_content};

/// File-name suffixes marking an in-progress download; never moved.
pub const TEMP_SUFFIXES: &[&str] = &[".tmp", ".crdownload", ".part", ".partial"];

/// True for names carrying a recognized incomplete-download suffix.
pub fn is_temporary_artifact(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    TEMP_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// True for hidden or in-progress marker prefixes (dotfiles, office `~$` locks).
pub fn has_in_progress_prefix(name: &str) -> bool {
    name.starts_with('~') || name.starts_with('.')
}

/// Why a path was skipped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Directory,
    Symlink,
    TemporaryArtifact,
    InProgressPrefix,
    /// Source no longer present — typically already moved by a racing task.
    Vanished,
}

/// Outcome of a successful mover invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved {
        dest: PathBuf,
        category: &'static str,
    },
    Skipped(SkipReason),
}

// Result of one relocation attempt.
enum Attempt {
    Moved,
    /// Destination already held the same bytes; leftover source removed.
    AlreadyStaged,
    SourceVanished,
}

/// Move `src` into the category subfolder of `cfg.target_dir`.
///
/// Skips directories, symlinks, temporary artifacts and vanished sources
/// silently. Other failures retry up to `cfg.timing.max_attempts` with
/// `cfg.timing.retry_delay` backoff; exhaustion is terminal for this file
/// only and leaves the source in place for a later sweep.
pub fn move_file(cfg: &Config, src: &Path) -> Result<MoveOutcome, SortdError> {
    let Some(name_os) = src.file_name() else {
        debug!(path = %src.display(), "skip: path has no file name");
        return Ok(MoveOutcome::Skipped(SkipReason::Vanished));
    };
    let name = name_os.to_string_lossy().into_owned();

    if is_temporary_artifact(&name) {
        debug!(path = %src.display(), "skip: temporary artifact");
        return Ok(MoveOutcome::Skipped(SkipReason::TemporaryArtifact));
    }
    if has_in_progress_prefix(&name) {
        debug!(path = %src.display(), "skip: hidden/in-progress prefix");
        return Ok(MoveOutcome::Skipped(SkipReason::InProgressPrefix));
    }

    match fs::symlink_metadata(src) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %src.display(), "skip: source vanished before move");
            return Ok(MoveOutcome::Skipped(SkipReason::Vanished));
        }
        Err(e) => {
            debug!(path = %src.display(), error = %e, "stat failed; proceeding to attempt loop");
        }
        Ok(meta) if meta.is_dir() => {
            debug!(path = %src.display(), "skip: directory");
            return Ok(MoveOutcome::Skipped(SkipReason::Directory));
        }
        Ok(meta) if meta.file_type().is_symlink() => {
            debug!(path = %src.display(), "skip: symlink");
            return Ok(MoveOutcome::Skipped(SkipReason::Symlink));
        }
        Ok(_) => {}
    }

    // Let the producing process release its handle before we touch the file.
    sleep_unless_shutdown(cfg.timing.settle);

    let category = classify(&name);
    let dest_dir = cfg.target_dir.join(category);
    let dest = dest_dir.join(name_os);

    let max_attempts = cfg.timing.max_attempts.max(1);
    let mut last_error = String::new();
    let mut attempts_made = 0;

    for attempt in 1..=max_attempts {
        attempts_made = attempt;
        match attempt_move(src, &dest_dir, &dest) {
            Ok(Attempt::Moved) => {
                info!(src = %src.display(), dest = %dest.display(), category, "moved");
                return Ok(MoveOutcome::Moved { dest, category });
            }
            Ok(Attempt::AlreadyStaged) => {
                info!(
                    src = %src.display(),
                    dest = %dest.display(),
                    category,
                    "destination already staged; removed leftover source"
                );
                return Ok(MoveOutcome::Moved { dest, category });
            }
            Ok(Attempt::SourceVanished) => {
                debug!(path = %src.display(), "skip: source vanished mid-move");
                return Ok(MoveOutcome::Skipped(SkipReason::Vanished));
            }
            Err(e) => {
                last_error = format!("{e:#}");
                if attempt < max_attempts {
                    warn!(
                        path = %src.display(),
                        category,
                        attempt,
                        max_attempts,
                        error = %last_error,
                        "move failed; retrying"
                    );
                    if !sleep_unless_shutdown(cfg.timing.retry_delay) {
                        warn!(path = %src.display(), "shutdown requested; abandoning retries");
                        break;
                    }
                }
            }
        }
    }

    let err = SortdError::RetriesExhausted {
        path: src.to_path_buf(),
        category,
        attempts: attempts_made,
        last_error: last_error.clone(),
    };
    error!(
        code = err.code(),
        path = %src.display(),
        category,
        attempts = attempts_made,
        error = %last_error,
        "giving up; file stays in source for a later sweep"
    );
    Err(err)
}

/// One relocation attempt. Retryable problems come back as Err.
fn attempt_move(src: &Path, dest_dir: &Path, dest: &Path) -> anyhow::Result<Attempt> {
    // Idempotent create; concurrent movers may race on the same category.
    fs::create_dir_all(dest_dir).map_err(io_error_with_help("create category directory", dest_dir))?;

    if !src.exists() {
        return Ok(Attempt::SourceVanished);
    }

    if dest.exists() {
        if same_content(src, dest) {
            fs::remove_file(src).map_err(io_error_with_help("remove leftover source", src))?;
            return Ok(Attempt::AlreadyStaged);
        }
        anyhow::bail!(
            "destination '{}' exists with different content; not overwriting",
            dest.display()
        );
    }

    match fs::rename(src, dest) {
        Ok(()) => Ok(Attempt::Moved),
        Err(e) if is_cross_device(&e) => {
            debug!(src = %src.display(), dest = %dest.display(), "cross-device; copying instead");
            fs::copy(src, dest).map_err(io_error_with_help("copy to destination", dest))?;
            fs::remove_file(src).map_err(io_error_with_help("remove original after copy", src))?;
            Ok(Attempt::Moved)
        }
        Err(e) => {
            // A racing mover may have completed the relocation between our
            // checks and the rename.
            if dest.exists() {
                if !src.exists() {
                    return Ok(Attempt::SourceVanished);
                }
                if same_content(src, dest) {
                    fs::remove_file(src)
                        .map_err(io_error_with_help("remove leftover source", src))?;
                    return Ok(Attempt::AlreadyStaged);
                }
            }
            Err(io_error_with_help("rename to destination", dest)(e))
        }
    }
}

#[cfg(unix)]
fn is_cross_device(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(not(unix))]
fn is_cross_device(e: &io::Error) -> bool {
    // ERROR_NOT_SAME_DEVICE
    e.raw_os_error() == Some(17)
}

/// Sleep in small slices, aborting early when process shutdown is requested.
/// Returns false when the sleep was cut short.
pub(crate) fn sleep_unless_shutdown(total: Duration) -> bool {
    const SLICE: Duration = Duration::from_millis(50);
    let mut remaining = total;
    while !remaining.is_zero() {
        if shutdown::is_requested() {
            return false;
        }
        let step = remaining.min(SLICE);
        std::thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
    !shutdown::is_requested()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporary_artifact_suffixes_are_recognized() {
        assert!(is_temporary_artifact("movie.mkv.part"));
        assert!(is_temporary_artifact("report.pdf.crdownload"));
        assert!(is_temporary_artifact("scratch.tmp"));
        assert!(is_temporary_artifact("SHOUTY.CRDOWNLOAD"));
        assert!(!is_temporary_artifact("report.pdf"));
        assert!(!is_temporary_artifact("partly.txt"));
    }

    #[test]
    fn in_progress_prefixes_are_recognized() {
        assert!(has_in_progress_prefix("~$budget.xlsx"));
        assert!(has_in_progress_prefix(".hidden"));
        assert!(!has_in_progress_prefix("budget.xlsx"));
    }

    #[test]
    #[serial_test::serial]
    fn sleep_aborts_when_shutdown_requested() {
        shutdown::reset();
        shutdown::request();
        assert!(!sleep_unless_shutdown(Duration::from_secs(5)));
        shutdown::reset();
    }

    #[test]
    #[serial_test::serial]
    fn shutdown_abort_reports_actual_attempt_count() {
        shutdown::reset();
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let mut cfg = Config::new(source.path(), target.path());
        cfg.log_file = None;
        cfg.timing.settle = Duration::from_millis(1);
        cfg.timing.retry_delay = Duration::from_secs(2);
        cfg.timing.max_attempts = 5;

        // A file where the category directory should go blocks every attempt.
        fs::write(target.path().join("Documents"), b"in the way").unwrap();
        let src = source.path().join("thesis.pdf");
        fs::write(&src, b"pdf").unwrap();

        shutdown::request();
        let err = move_file(&cfg, &src).unwrap_err();
        shutdown::reset();

        match err {
            SortdError::RetriesExhausted { attempts, .. } => {
                assert_eq!(attempts, 1, "backoff was aborted after the first attempt");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(src.exists());
    }
}
