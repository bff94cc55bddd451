//! Config module (modularized).
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{
    default_config_path, default_log_path, default_source_dir, default_target_dir,
    path_has_symlink_ancestor,
};
pub use types::{Config, LogLevel, Timing};
pub use xml::{create_template_config, ensure_default_config_exists, load_config};

/// Environment variable naming an explicit config file location.
pub const CONFIG_ENV: &str = "SORTD_CONFIG";
