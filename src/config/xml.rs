//! XML configuration support.
//! - Loads settings from config.xml (quick_xml).
//! - Creates a commented template if missing (unless SORTD_CONFIG is set).
//!
//! Notes:
//! - This module only reads/writes the config file; directory validation
//!   happens in `validate`.
//! - Unknown XML fields are rejected to surface misconfigurations early.

use anyhow::{Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use super::paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use super::CONFIG_ENV;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    source_dir: Option<String>,
    target_dir: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    /// Optional override of the reconciliation sweep interval, in seconds.
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    sweep_interval_seconds: Option<u64>,
}

// Trims surrounding whitespace before parsing an optional u64; quick_xml
// preserves text-node whitespace.
fn de_u64_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| s.trim().parse::<u64>().ok()))
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

// Map XmlConfig onto a default Config; absent fields keep their defaults.
fn xml_to_config(parsed: XmlConfig) -> Config {
    let mut cfg = Config::default();

    if let Some(s) = parsed.source_dir.as_deref().and_then(non_empty) {
        cfg.source_dir = PathBuf::from(s);
    }
    if let Some(s) = parsed.target_dir.as_deref().and_then(non_empty) {
        cfg.target_dir = PathBuf::from(s);
    }
    if let Some(level) = parsed
        .log_level
        .as_deref()
        .and_then(non_empty)
        .and_then(LogLevel::parse)
    {
        cfg.log_level = level;
    }
    if let Some(s) = parsed.log_file.as_deref().and_then(non_empty) {
        cfg.log_file = Some(PathBuf::from(s));
    }
    if let Some(secs) = parsed.sweep_interval_seconds.filter(|s| *s > 0) {
        cfg.timing.sweep_interval = Duration::from_secs(secs);
    }

    cfg
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig =
        from_xml_str(&contents).with_context(|| format!("parse config xml '{}'", path.display()))?;
    Ok(xml_to_config(parsed))
}

/// Load the effective config file, if any.
/// - SORTD_CONFIG (if set) must exist and parse; errors are surfaced.
/// - Otherwise the platform default path is tried; a missing file is Ok(None).
pub fn load_config() -> Result<Option<Config>> {
    if let Some(p) = env::var_os(CONFIG_ENV) {
        let cfg = load_config_from_path(Path::new(&p))?;
        return Ok(Some(cfg));
    }

    let path = default_config_path().context("resolve default config path")?;
    if !path.exists() {
        return Ok(None);
    }
    load_config_from_path(&path).map(Some)
}

/// Create the template config file and parent directory.
/// Refuses to write through a symlinked ancestor.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        return Err(anyhow::anyhow!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        ));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(parent, fs::Permissions::from_mode(0o700));
        }
    }

    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "/path/to/sortd.log".into());

    let content = format!(
        "<!--\n  sortd configuration (XML)\n\n  Fields:\n    source_dir              -> directory watched for arriving files\n    target_dir              -> root of the category tree files are moved into\n    log_level               -> quiet | normal | info | debug\n    log_file                -> path to log file (optional; stdout still used)\n    sweep_interval_seconds  -> seconds between reconciliation sweeps\n\n  Notes:\n    - CLI flags override XML values.\n    - The category table is fixed; files with unknown extensions land in Other/.\n-->\n<config>\n  <source_dir>{}</source_dir>\n  <target_dir>{}</target_dir>\n  <log_level>normal</log_level>\n  <log_file>{}</log_file>\n  <sweep_interval_seconds>5</sweep_interval_seconds>\n</config>\n",
        super::default_source_dir().display(),
        super::default_target_dir().display(),
        suggested_log,
    );

    fs::write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }

    info!("Created template config at {}", path.display());
    Ok(())
}

/// Create the default config if SORTD_CONFIG is not set and none exists yet.
/// Returns the created path so the CLI can inform the user.
pub fn ensure_default_config_exists() -> Option<PathBuf> {
    if env::var_os(CONFIG_ENV).is_some() {
        return None;
    }

    let cfg_path = default_config_path().ok()?;
    if cfg_path.exists() {
        return None;
    }

    match create_template_config(&cfg_path) {
        Ok(()) => Some(cfg_path),
        Err(e) => {
            eprintln!(
                "Failed to create template config at {}: {}",
                cfg_path.display(),
                e
            );
            None
        }
    }
}
