//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - CLI flags override config-file values.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::{Config, LogLevel};

/// Watch a downloads folder and sort arriving files into category subfolders.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Sort arriving files into category folders")]
pub struct Args {
    /// Override the watched source directory (normally configured via XML).
    #[arg(long, value_hint = ValueHint::DirPath, help = "Override the watched source directory")]
    pub source_dir: Option<PathBuf>,

    /// Override the target directory root (normally configured via XML).
    #[arg(long, value_hint = ValueHint::DirPath, help = "Override the target directory root")]
    pub target_dir: Option<PathBuf>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Print where sortd will look for the config file (or SORTD_CONFIG if set), then exit.
    #[arg(long, help = "Print the config file location used by sortd and exit")]
    pub print_config: bool,

    /// Run a single reconciliation pass over the source directory, then exit.
    #[arg(
        long,
        help = "Sort everything currently in the source directory once, then exit"
    )]
    pub once: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(src) = &self.source_dir {
            cfg.source_dir = src.clone();
        }
        if let Some(dst) = &self.target_dir {
            cfg.target_dir = dst.clone();
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_wins_over_log_level() {
        let args = Args::parse_from(["sortd", "--debug", "--log-level", "quiet"]);
        assert_eq!(args.effective_log_level(), Some(LogLevel::Debug));
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let args = Args::parse_from(["sortd", "--source-dir", "/tmp/in"]);
        let mut cfg = Config::new("/a", "/b");
        args.apply_overrides(&mut cfg);
        assert_eq!(cfg.source_dir, PathBuf::from("/tmp/in"));
        assert_eq!(cfg.target_dir, PathBuf::from("/b"));
    }
}
