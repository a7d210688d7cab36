//! YAML configuration discovery and loading.
//!
//! The configuration lives in `~/.config/kanata-layer-monitor/`.  Two file
//! names are probed in order and the first one that exists wins:
//!
//! 1. `config.yaml`
//! 2. `config.yml`
//!
//! If neither exists (or `HOME` is unset) the monitor runs with
//! [`Configuration::default`].  A file that exists but cannot be read or
//! parsed is reported by [`load`]; [`load_initial`] logs that error and
//! falls back to defaults, so a broken config never stops the tray from
//! starting.
//!
//! # Serde default values
//!
//! Every key is optional.  After parsing, [`Configuration::with_defaults`]
//! fills in an empty `host` and a zero `port`.  An empty document (or one
//! that contains only comments) is the same as no file at all.

use std::path::{Path, PathBuf};

use layer_monitor_core::Configuration;
use thiserror::Error;
use tracing::{info, warn};

use super::APP_DIR_NAME;

/// Probed file names, in priority order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["config.yaml", "config.yml"];

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `HOME` is not set, so the config directory cannot be located.
    #[error("could not determine home directory (HOME is not set)")]
    NoHomeDir,

    /// The file exists but could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML, or does not match the schema.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A configuration together with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: Configuration,
    /// `None` when running on defaults.
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    /// Configuration with every value defaulted and no backing file.
    pub fn defaults() -> Self {
        Self {
            config: Configuration::default(),
            source: None,
        }
    }

    /// Directory that relative icon paths are resolved against.
    pub fn source_dir(&self) -> Option<&Path> {
        self.source.as_deref().and_then(Path::parent)
    }
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// `<home>/.config/kanata-layer-monitor`.
pub fn config_dir(home: &Path) -> PathBuf {
    home.join(".config").join(APP_DIR_NAME)
}

/// All probed config file paths under `home`, in priority order.
pub fn candidate_paths(home: &Path) -> Vec<PathBuf> {
    let dir = config_dir(home);
    CONFIG_FILE_NAMES.iter().map(|name| dir.join(name)).collect()
}

/// Returns the first candidate path under `home` that exists.
pub fn discover(home: &Path) -> Option<PathBuf> {
    candidate_paths(home).into_iter().find(|path| path.is_file())
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Reads and parses the configuration at `path`, then default-fills it.
///
/// The file is parsed as YAML whatever its extension; a name that does not
/// end in `.yaml` or `.yml` is only warned about.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if it is not a valid configuration document.
pub fn load(path: &Path) -> Result<Configuration, ConfigError> {
    if !has_yaml_extension(path) {
        warn!(
            path = %path.display(),
            "config file does not have a .yaml or .yml extension; parsing as YAML anyway"
        );
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config = if is_blank_document(&content) {
        Configuration::default()
    } else {
        serde_yaml::from_str::<Configuration>(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };

    Ok(config.with_defaults())
}

/// Discovers and loads the configuration under `home`.
///
/// Returns `Ok(None)` when no candidate file exists.
///
/// # Errors
///
/// Propagates [`load`] errors for the discovered file.
pub fn load_from_home(home: &Path) -> Result<Option<LoadedConfig>, ConfigError> {
    let Some(path) = discover(home) else {
        return Ok(None);
    };
    let config = load(&path)?;
    Ok(Some(LoadedConfig {
        config,
        source: Some(path),
    }))
}

/// Startup entry point: loads the configuration under `home`, logging and
/// falling back to defaults on any failure.
pub fn load_initial(home: Option<&Path>) -> LoadedConfig {
    let Some(home) = home else {
        warn!("{}; using default configuration", ConfigError::NoHomeDir);
        return LoadedConfig::defaults();
    };

    match load_from_home(home) {
        Ok(Some(loaded)) => {
            if let Some(path) = &loaded.source {
                info!("Config loaded from {}", path.display());
            }
            loaded
        }
        Ok(None) => {
            info!(
                dir = %config_dir(home).display(),
                "no config file found; using default configuration"
            );
            LoadedConfig::defaults()
        }
        Err(e) => {
            warn!("{e}; using default configuration");
            LoadedConfig::defaults()
        }
    }
}

/// `true` if `content` holds nothing but whitespace and comments.
fn is_blank_document(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

fn has_yaml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
