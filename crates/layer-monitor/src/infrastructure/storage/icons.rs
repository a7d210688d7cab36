//! Per-layer icon loading.
//!
//! Icons are read once, right after the configuration is loaded.  A path in
//! `layers.<name>.icon.path` is resolved against the directory holding the
//! configuration file (absolute paths are used as-is).  A failed read is
//! logged and leaves no cache entry; that layer then shows the default icon.

use std::path::{Path, PathBuf};

use layer_monitor_core::{Configuration, IconCache};
use thiserror::Error;
use tracing::{info, warn};

/// Error type for loading one layer icon.
#[derive(Debug, Error)]
pub enum IconLoadError {
    #[error("failed to read icon for layer \"{layer}\" at {path}: {source}")]
    Io {
        layer: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("icon for layer \"{layer}\" at {path} is empty")]
    Empty { layer: String, path: PathBuf },
}

/// Resolves `icon_path` against `config_dir`.
pub fn resolve_icon_path(config_dir: &Path, icon_path: &str) -> PathBuf {
    config_dir.join(icon_path)
}

/// Reads the icon for `layer` from `path`.
///
/// # Errors
///
/// Returns [`IconLoadError::Io`] if the file cannot be read and
/// [`IconLoadError::Empty`] if it has no content.
pub fn load_icon(layer: &str, path: &Path) -> Result<Vec<u8>, IconLoadError> {
    let bytes = std::fs::read(path).map_err(|source| IconLoadError::Io {
        layer: layer.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(IconLoadError::Empty {
            layer: layer.to_string(),
            path: path.to_path_buf(),
        });
    }
    Ok(bytes)
}

/// Loads the icon of every configured layer that names one.
///
/// Never fails as a whole: each failure is logged and that layer is left
/// out of the returned cache.
pub fn build_icon_cache(config: &Configuration, config_dir: &Path) -> IconCache {
    let mut cache = IconCache::new();
    for (layer, icon_path) in config.icon_paths() {
        let path = resolve_icon_path(config_dir, icon_path);
        match load_icon(layer, &path) {
            Ok(bytes) => {
                info!(path = %path.display(), "Icon for layer {layer} loaded");
                cache.insert(layer, bytes);
            }
            Err(e) => warn!("{e}; using default icon"),
        }
    }
    cache
}

// ── Tests ─────────────────────────────────────────────────────────────────────
