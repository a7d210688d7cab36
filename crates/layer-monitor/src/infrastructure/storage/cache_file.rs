//! The current-layer cache file.
//!
//! Every display change rewrites `~/.cache/kanata-layer-monitor/current-layer`
//! with exactly the resolved display text (no trailing newline), so shell
//! prompts and status bars can show the layer without talking to the daemon.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::APP_DIR_NAME;
use crate::application::show_layer::{CacheWriteError, LayerSink};

/// File name of the mirror inside the app's cache directory.
pub const CACHE_FILE_NAME: &str = "current-layer";

/// Mirrors the current display text to a file.
#[derive(Debug, Clone)]
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<home>/.cache/kanata-layer-monitor/current-layer`.
    pub fn in_home(home: &Path) -> Self {
        Self::new(home.join(".cache").join(APP_DIR_NAME).join(CACHE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, text: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o640);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(text.as_bytes())?;
        file.flush()
    }
}

impl LayerSink for CacheFile {
    fn write_text(&self, text: &str) -> Result<(), CacheWriteError> {
        self.write(text).map_err(|source| CacheWriteError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Sink used when the cache file location is unknown (`HOME` unset).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCacheFile;

impl LayerSink for NoCacheFile {
    fn write_text(&self, text: &str) -> Result<(), CacheWriteError> {
        debug!("cache file disabled; not mirroring {text:?}");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_in_home_builds_well_known_path() {
        let cache = CacheFile::in_home(Path::new("/home/alice"));

        assert_eq!(
            cache.path(),
            Path::new("/home/alice/.cache/kanata-layer-monitor/current-layer")
        );
    }

    #[test]
    fn test_write_creates_parent_directories() {
        // Arrange
        let home = TempDir::new().unwrap();
        let cache = CacheFile::in_home(home.path());

        // Act
        cache.write_text("nav").unwrap();

        // Assert
        assert_eq!(std::fs::read_to_string(cache.path()).unwrap(), "nav");
    }

    #[test]
    fn test_write_truncates_previous_content() {
        let home = TempDir::new().unwrap();
        let cache = CacheFile::in_home(home.path());

        cache.write_text("a-much-longer-layer-name").unwrap();
        cache.write_text("").unwrap();
        cache.write_text("fn").unwrap();

        assert_eq!(std::fs::read_to_string(cache.path()).unwrap(), "fn");
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_not_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let home = TempDir::new().unwrap();
        let cache = CacheFile::in_home(home.path());

        cache.write_text("nav").unwrap();

        let mode = std::fs::metadata(cache.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o007, 0, "others must have no access");
    }

    #[test]
    fn test_write_failure_reports_path() {
        // Arrange: the parent "directory" is a regular file.
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let cache = CacheFile::new(blocker.join("current-layer"));

        // Act
        let err = cache.write_text("nav").unwrap_err();

        // Assert
        let CacheWriteError::Io { path, .. } = err;
        assert_eq!(path, blocker.join("current-layer"));
    }

    #[test]
    fn test_no_cache_file_accepts_writes() {
        assert!(NoCacheFile.write_text("nav").is_ok());
    }
}
