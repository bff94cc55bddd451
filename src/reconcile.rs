//! Periodic reconciliation sweep.
//! Filesystem notification delivery is not guaranteed exhaustive — events
//! coalesce, watches have brief gaps — so a timer loop re-lists the source
//! directory and submits anything unclaimed to the mover. A correctness
//! backstop, not an optimization.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Config;
use crate::mover::{self, has_in_progress_prefix, is_temporary_artifact, MoveOutcome};
use crate::pending::PendingMoves;
use crate::shutdown;

/// Start the sweeper thread. It runs until `stop` is set (or process
/// shutdown) and checks the flag at a fine grain so stopping is prompt.
pub fn spawn(cfg: Arc<Config>, pending: PendingMoves, stop: Arc<AtomicBool>) -> JoinHandle<()> {
    thread::Builder::new()
        .name("sortd-sweep".into())
        .spawn(move || {
            while wait_interval(&stop, cfg.timing.sweep_interval) {
                sweep(&cfg, &pending);
            }
            debug!("reconciliation sweeper stopped");
        })
        .expect("failed to spawn sweeper thread")
}

/// Sleep for `total` in small slices; false once stopping was requested.
fn wait_interval(stop: &AtomicBool, total: Duration) -> bool {
    const SLICE: Duration = Duration::from_millis(100);
    let mut remaining = total;
    while !remaining.is_zero() {
        if stop.load(Ordering::Relaxed) || shutdown::is_requested() {
            return false;
        }
        let step = remaining.min(SLICE);
        thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
    !(stop.load(Ordering::Relaxed) || shutdown::is_requested())
}

/// One pass: list the source directory and hand every eligible, unclaimed
/// entry to a mover thread. Each submission is independent so one stuck file
/// cannot stall the sweep.
fn sweep(cfg: &Arc<Config>, pending: &PendingMoves) {
    let entries = match fs::read_dir(&cfg.source_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %cfg.source_dir.display(), error = %e, "sweep: cannot list source directory");
            return;
        }
    };

    debug!(path = %cfg.source_dir.display(), "reconciliation sweep");
    for entry in entries.flatten() {
        let path = entry.path();
        if !eligible(&entry, &path) {
            continue;
        }
        if pending.contains(&path) {
            debug!(path = %path.display(), "sweep: move already in flight");
            continue;
        }

        let cfg = Arc::clone(cfg);
        let pending = pending.clone();
        thread::spawn(move || {
            let Some(_claim) = pending.claim(&path) else {
                return;
            };
            let _ = mover::move_file(&cfg, &path);
        });
    }
}

fn eligible(entry: &fs::DirEntry, path: &Path) -> bool {
    if entry.file_type().map(|t| t.is_dir()).unwrap_or(true) {
        return false;
    }
    let name = entry.file_name();
    let name = name.to_string_lossy();
    !is_temporary_artifact(&name) && !has_in_progress_prefix(&name)
}

/// Counters reported by a one-shot pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Synchronous single pass over the source directory, used by `--once`.
/// Files are processed sequentially; failures are logged by the mover and
/// counted here.
pub fn sweep_once(cfg: &Config) -> SweepSummary {
    let mut summary = SweepSummary::default();

    let entries = match fs::read_dir(&cfg.source_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %cfg.source_dir.display(), error = %e, "cannot list source directory");
            return summary;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !eligible(&entry, &path) {
            summary.skipped += 1;
            continue;
        }
        match mover::move_file(cfg, &path) {
            Ok(MoveOutcome::Moved { .. }) => summary.moved += 1,
            Ok(MoveOutcome::Skipped(_)) => summary.skipped += 1,
            Err(_) => summary.failed += 1,
        }
    }
    summary
}
