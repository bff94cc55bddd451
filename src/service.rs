//! Sorter lifecycle: owns the watch, the sweeper, and the run state.
//! Any front end (CLI today, a GUI tomorrow) drives the core exclusively
//! through the [`SorterControl`] capability set.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::errors::SortdError;
use crate::pending::PendingMoves;
use crate::reconcile;
use crate::watch::EventWatch;

/// Whether the sorter is currently monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

/// Control surface consumed by front ends. No sorting logic leaks through it.
pub trait SorterControl {
    /// Begin monitoring. No-op when already running; fails (and stays
    /// Stopped) when the source directory does not exist.
    fn start(&mut self) -> Result<()>;
    /// Stop scheduling new work and quiesce. In-flight moves run to
    /// completion on their own threads. No-op when already stopped.
    fn stop(&mut self);
    /// Read-only run-state snapshot.
    fn status(&self) -> RunState;
    /// Replace the directories. Refused while running; callers must
    /// Stop → Reconfigure → Start.
    fn reconfigure(&mut self, source_dir: PathBuf, target_dir: PathBuf)
        -> Result<(), SortdError>;
    /// Current configuration.
    fn config(&self) -> &Config;
}

pub struct SorterService {
    config: Config,
    state: RunState,
    watch: Option<EventWatch>,
    sweeper: Option<JoinHandle<()>>,
    stop_flag: Arc<AtomicBool>,
    // Shared across start/stop cycles: movers still retrying from a previous
    // run keep their claims, so a restarted sweep cannot double-queue them.
    pending: PendingMoves,
}

impl SorterService {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: RunState::Stopped,
            watch: None,
            sweeper: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            pending: PendingMoves::new(),
        }
    }

    /// The claim set, exposed for tests and diagnostics.
    pub fn pending(&self) -> &PendingMoves {
        &self.pending
    }
}

impl SorterControl for SorterService {
    fn start(&mut self) -> Result<()> {
        if self.state == RunState::Running {
            warn!("start ignored: already running");
            return Ok(());
        }

        // Source must exist; target is created. Failure leaves us Stopped.
        self.config.validate()?;

        // Components read a consistent snapshot for the whole run.
        let cfg = Arc::new(runtime_snapshot(&self.config));
        self.stop_flag = Arc::new(AtomicBool::new(false));

        self.watch = Some(EventWatch::spawn(Arc::clone(&cfg), self.pending.clone())?);
        self.sweeper = Some(reconcile::spawn(
            cfg,
            self.pending.clone(),
            Arc::clone(&self.stop_flag),
        ));

        self.state = RunState::Running;
        info!(
            source = %self.config.source_dir.display(),
            target = %self.config.target_dir.display(),
            "sorter started"
        );
        Ok(())
    }

    fn stop(&mut self) {
        if self.state == RunState::Stopped {
            return;
        }

        self.stop_flag.store(true, Ordering::Relaxed);
        // Dropping the watch unsubscribes from notifications.
        self.watch = None;
        if let Some(handle) = self.sweeper.take() {
            // The sweeper polls the stop flag at a fine grain, so this join
            // is bounded.
            if handle.join().is_err() {
                error!("sweeper thread panicked");
            }
        }

        self.state = RunState::Stopped;
        info!("sorter stopped");
    }

    fn status(&self) -> RunState {
        self.state
    }

    fn reconfigure(
        &mut self,
        source_dir: PathBuf,
        target_dir: PathBuf,
    ) -> Result<(), SortdError> {
        if self.state == RunState::Running {
            warn!(
                code = SortdError::ReconfigureWhileRunning.code(),
                "reconfigure refused while running"
            );
            return Err(SortdError::ReconfigureWhileRunning);
        }
        info!(
            source = %source_dir.display(),
            target = %target_dir.display(),
            "directories updated"
        );
        self.config.source_dir = source_dir;
        self.config.target_dir = target_dir;
        Ok(())
    }

    fn config(&self) -> &Config {
        &self.config
    }
}

/// Snapshot with a canonical source directory. Notification events carry the
/// path exactly as registered, while the sweep builds paths from
/// `source_dir`; claims are keyed on those paths, so both sides must spell
/// them identically — a relative or symlinked source would otherwise let the
/// same file be queued twice.
fn runtime_snapshot(config: &Config) -> Config {
    let mut snapshot = config.clone();
    if let Ok(real) = fs::canonicalize(&snapshot.source_dir) {
        snapshot.source_dir = real;
    }
    snapshot
}

impl Drop for SorterService {
    fn drop(&mut self) {
        self.stop();
    }
}
