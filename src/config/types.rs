//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - Timing groups the fixed delays; carried in Config so tests can compress time.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::paths;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Delays and ceilings for moving and sweeping.
/// Defaults match the long-standing constants; tests shrink them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timing {
    /// Wait before touching any file, so the producing process can release it.
    pub settle: Duration,
    /// Extra wait after a "created" notification; one-shot writes (icons,
    /// small saves) are often still mid-write when the event fires.
    pub event_settle: Duration,
    /// Backoff between move attempts.
    pub retry_delay: Duration,
    /// Attempt ceiling per file; exhaustion is terminal for that file only.
    pub max_attempts: u32,
    /// Interval between reconciliation sweeps of the source directory.
    pub sweep_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(500),
            event_settle: Duration::from_millis(1500),
            retry_delay: Duration::from_secs(2),
            max_attempts: 5,
            sweep_interval: Duration::from_secs(5),
        }
    }
}

/// Runtime configuration for the sorter.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory watched for arriving files (non-recursive)
    pub source_dir: PathBuf,
    /// Root of the category tree files are moved into
    pub target_dir: PathBuf,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Delays and retry ceilings
    pub timing: Timing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: paths::default_source_dir(),
            target_dir: paths::default_target_dir(),
            log_level: LogLevel::Normal,
            log_file: paths::default_log_path().ok(),
            timing: Timing::default(),
        }
    }
}

impl Config {
    /// Construct a Config with explicit directories; other fields use defaults.
    pub fn new(source_dir: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            ..Default::default()
        }
    }
}
