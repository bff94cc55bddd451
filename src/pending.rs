//! Claim/release set for in-flight moves.
//! The live watch and the reconciliation sweep can both discover the same
//! file; whoever claims the path first owns the move, the other side skips.
//! A claim is released when its guard drops, success or not, so an exhausted
//! move becomes claimable again on the next sweep.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Shared set of source paths currently owned by an in-flight mover task.
#[derive(Debug, Clone, Default)]
pub struct PendingMoves {
    inner: Arc<Mutex<HashSet<PathBuf>>>,
}

impl PendingMoves {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim `path`. Returns `None` when another task already holds it.
    pub fn claim(&self, path: &Path) -> Option<PendingClaim> {
        let mut set = self.inner.lock().expect("pending set poisoned");
        if set.insert(path.to_path_buf()) {
            Some(PendingClaim {
                set: Arc::clone(&self.inner),
                path: path.to_path_buf(),
            })
        } else {
            None
        }
    }

    /// Whether `path` is currently claimed.
    pub fn contains(&self, path: &Path) -> bool {
        self.inner.lock().expect("pending set poisoned").contains(path)
    }

    /// Number of in-flight claims.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("pending set poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// RAII guard for a claimed path; releases the claim on drop.
#[derive(Debug)]
pub struct PendingClaim {
    set: Arc<Mutex<HashSet<PathBuf>>>,
    path: PathBuf,
}

impl Drop for PendingClaim {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.path);
        }
    }
}
