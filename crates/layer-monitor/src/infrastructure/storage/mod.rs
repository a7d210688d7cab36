//! Filesystem access: configuration discovery, layer icons, and the
//! current-layer cache file.
//!
//! All paths hang off the user's home directory:
//!
//! - `~/.config/kanata-layer-monitor/config.yaml` (or `config.yml`)
//! - `~/.cache/kanata-layer-monitor/current-layer`

use std::path::PathBuf;

pub mod cache_file;
pub mod config;
pub mod icons;

/// Directory name used under both `~/.config` and `~/.cache`.
pub const APP_DIR_NAME: &str = "kanata-layer-monitor";

/// Returns the user's home directory from `HOME`, if set and non-empty.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}
