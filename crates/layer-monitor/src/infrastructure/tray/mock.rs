//! Recording tray and cache sink for tests.
//!
//! The real tray front-ends need a desktop session, and the real cache file
//! lives in the user's home directory.  These fakes record every call in a
//! `Mutex<Vec<...>>` so tests can assert exactly what was shown and in what
//! order, from any thread.
//!
//! # Usage in tests
//!
//! ```ignore
//! let tray = Arc::new(RecordingTray::new());
//! let sink = Arc::new(RecordingSink::new());
//! let display = LayerDisplay::new(DisplayContext { tray: tray.clone(), sink: sink.clone(), .. });
//!
//! assert_eq!(tray.titles(), vec![" nav"]);
//! assert_eq!(sink.writes(), vec!["nav"]);
//! ```
//!
//! Construct with [`RecordingTray::failing`] to make every call return
//! [`TrayError::Backend`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::application::show_layer::{
    CacheWriteError, LayerSink, MenuEntry, MenuId, TrayAdapter, TrayError,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A tray that records all calls instead of drawing anything.
#[derive(Debug, Default)]
pub struct RecordingTray {
    titles: Mutex<Vec<String>>,
    icons: Mutex<Vec<Vec<u8>>>,
    tooltips: Mutex<Vec<String>>,
    menu: Mutex<Vec<MenuEntry>>,
    separators: Mutex<usize>,
    should_fail: bool,
}

impl RecordingTray {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tray whose every operation fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Every title set so far, oldest first.
    pub fn titles(&self) -> Vec<String> {
        lock(&self.titles).clone()
    }

    /// Every icon set so far, oldest first.
    pub fn icons(&self) -> Vec<Vec<u8>> {
        lock(&self.icons).clone()
    }

    pub fn tooltips(&self) -> Vec<String> {
        lock(&self.tooltips).clone()
    }

    pub fn menu(&self) -> Vec<MenuEntry> {
        lock(&self.menu).clone()
    }

    pub fn separator_count(&self) -> usize {
        *lock(&self.separators)
    }

    fn check(&self) -> Result<(), TrayError> {
        if self.should_fail {
            return Err(TrayError::Backend("mock failure".into()));
        }
        Ok(())
    }
}

impl TrayAdapter for RecordingTray {
    fn set_title(&self, title: &str) -> Result<(), TrayError> {
        self.check()?;
        lock(&self.titles).push(title.to_string());
        Ok(())
    }

    fn set_icon(&self, icon: &[u8]) -> Result<(), TrayError> {
        self.check()?;
        lock(&self.icons).push(icon.to_vec());
        Ok(())
    }

    fn set_tooltip(&self, tooltip: &str) -> Result<(), TrayError> {
        self.check()?;
        lock(&self.tooltips).push(tooltip.to_string());
        Ok(())
    }

    fn add_menu_item(&self, entry: MenuEntry) -> Result<MenuId, TrayError> {
        self.check()?;
        let id = entry.id.clone();
        lock(&self.menu).push(entry);
        Ok(id)
    }

    fn add_separator(&self) -> Result<(), TrayError> {
        self.check()?;
        *lock(&self.separators) += 1;
        Ok(())
    }
}

/// A cache sink that records every write.
#[derive(Debug, Default)]
pub struct RecordingSink {
    writes: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every text written so far, oldest first.
    pub fn writes(&self) -> Vec<String> {
        lock(&self.writes).clone()
    }

    /// The current content, as the cache file would hold it.
    pub fn last(&self) -> Option<String> {
        lock(&self.writes).last().cloned()
    }
}

impl LayerSink for RecordingSink {
    fn write_text(&self, text: &str) -> Result<(), CacheWriteError> {
        lock(&self.writes).push(text.to_string());
        Ok(())
    }
}
