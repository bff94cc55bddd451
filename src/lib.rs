//! Core library for `sortd`.
//!
//! Watches a source directory for arriving files and relocates each one into
//! a category subfolder of a target directory, chosen by file extension.
//! Moves retry under transient contention (antivirus locks, half-written
//! downloads) and a periodic reconciliation sweep catches anything the live
//! watch missed. Front ends drive the core through [`service::SorterControl`].

pub mod app;
pub mod category;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod mover;
pub mod output;
pub mod pending;
pub mod reconcile;
pub mod service;
pub mod shutdown;
pub mod watch;

pub use category::{classify, CATEGORIES, FALLBACK_CATEGORY};
pub use config::{Config, LogLevel, Timing};
pub use errors::SortdError;
pub use mover::{move_file, MoveOutcome, SkipReason};
pub use pending::PendingMoves;
pub use service::{RunState, SorterControl, SorterService};
