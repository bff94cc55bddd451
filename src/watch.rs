//! Live filesystem watch on the source directory.
//! Subscribes to create and rename notifications (non-recursive) and hands
//! each qualifying path to the mover on its own thread, after claiming it so
//! the reconciliation sweep cannot double-queue the same file.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::errors::SortdError;
use crate::mover::{self, is_temporary_artifact, sleep_unless_shutdown};
use crate::pending::PendingMoves;

/// Owns the notify subscription; dropping it unsubscribes.
pub struct EventWatch {
    _watcher: RecommendedWatcher,
}

impl EventWatch {
    /// Start watching `cfg.source_dir` (non-recursive).
    pub fn spawn(cfg: Arc<Config>, pending: PendingMoves) -> Result<Self, SortdError> {
        let source = cfg.source_dir.clone();

        let mut watcher =
            notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
                Ok(event) => dispatch(&cfg, &pending, event),
                Err(e) => error!(error = %e, "watch error"),
            })?;
        watcher.watch(&source, RecursiveMode::NonRecursive)?;
        info!(path = %source.display(), "watching source directory");

        Ok(Self { _watcher: watcher })
    }
}

/// Route one notification. Must not block: the actual move (with its settling
/// delays) runs on a fresh thread.
fn dispatch(cfg: &Arc<Config>, pending: &PendingMoves, event: Event) {
    let created = match event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Name(mode)) => {
            // The old name of a rename has nothing to move.
            if matches!(mode, RenameMode::From) {
                return;
            }
            // For RenameMode::Both the paths are [from, to]; last() is the
            // new name either way.
            false
        }
        _ => return,
    };

    let Some(path) = event.paths.last().cloned() else {
        return;
    };

    debug!(path = %path.display(), created, "filesystem notification");
    spawn_move(Arc::clone(cfg), pending.clone(), path, created);
}

fn spawn_move(cfg: Arc<Config>, pending: PendingMoves, path: PathBuf, created: bool) {
    thread::spawn(move || {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        // Freshly created entries may still be mid-write when the event
        // fires; give the writer longer than the mover's own settle. Rename
        // targets (completed downloads dropping their suffix) are finished
        // already, and temporary artifacts get filtered by the mover anyway.
        if created && !is_temporary_artifact(&name) {
            if !sleep_unless_shutdown(cfg.timing.event_settle) {
                return;
            }
        }

        let Some(_claim) = pending.claim(&path) else {
            debug!(path = %path.display(), "already claimed by another task");
            return;
        };
        // Outcomes and failures are logged by the mover itself; a terminal
        // failure here must not take the watch down.
        let _ = mover::move_file(&cfg, &path);
    });
}
