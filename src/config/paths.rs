//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log paths and the default watched
//! directories, and detects symlinked ancestors for safety.

use dirs::{config_dir, data_dir, document_dir, download_dir, home_dir};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Default source: the platform downloads folder, else ~/Downloads.
pub fn default_source_dir() -> PathBuf {
    download_dir()
        .or_else(|| home_dir().map(|h| h.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default target: a "Sorted" tree under the platform documents folder.
pub fn default_target_dir() -> PathBuf {
    document_dir()
        .or_else(|| home_dir().map(|h| h.join("Documents")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Sorted")
}

/// OS-appropriate default config path.
pub fn default_config_path() -> Result<PathBuf> {
    let base = config_dir()
        .or_else(|| home_dir().map(|h| h.join(".config")))
        .context("could not determine a configuration directory")?;
    Ok(base.join("sortd").join("config.xml"))
}

/// OS-appropriate default log file path (data dir).
pub fn default_log_path() -> Result<PathBuf> {
    let base = data_dir()
        .or_else(|| home_dir().map(|h| h.join(".local").join("share")))
        .context("could not determine a data directory")?;
    Ok(base.join("sortd").join("sortd.log"))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_end_in_expected_names() {
        assert!(default_config_path().unwrap().ends_with("sortd/config.xml"));
        assert!(default_log_path().unwrap().ends_with("sortd/sortd.log"));
        assert!(default_target_dir().ends_with("Sorted"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_ancestor_is_detected() {
        let td = tempfile::tempdir().unwrap();
        let real = td.path().join("real");
        fs::create_dir_all(&real).unwrap();
        let link = td.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(path_has_symlink_ancestor(&link.join("file.log")).unwrap());
        assert!(!path_has_symlink_ancestor(&real.join("file.log")).unwrap());
    }
}
