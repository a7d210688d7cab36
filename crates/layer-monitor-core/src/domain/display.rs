//! Layer display resolution.
//!
//! Given a layer name (or one of the synthetic states used to report
//! connection problems), [`resolve_display`] decides which text and which
//! icon the tray should show:
//!
//! 1. A layer with no entry in `layers` shows its own name and the default icon.
//! 2. A configured layer shows `label.text` if set (else its name) and its
//!    cached icon if one loaded (else the default icon).
//! 3. A *real* layer whose label is `hidden` shows an empty text, so the tray
//!    is reduced to the icon.  Synthetic states are never hidden.
//!
//! The function is pure: it performs no I/O and never fails.

use std::collections::HashMap;
use std::fmt;

use crate::domain::config::Configuration;

/// A non-layer display state used to report progress or problems through
/// the same channel as real layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticState {
    /// Shown from startup until the first layer arrives.
    Booting,
    /// The daemon could not be reached, or the stream ended for good.
    Error,
    /// The daemon sent a line that is not valid JSON.
    InvalidMessage,
}

impl SyntheticState {
    /// The text shown for this state, also used as its `layers` lookup key.
    pub const fn as_str(self) -> &'static str {
        match self {
            SyntheticState::Booting => "...",
            SyntheticState::Error => "Error",
            SyntheticState::InvalidMessage => "N/A",
        }
    }
}

impl fmt::Display for SyntheticState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the display state machine is asked to show.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DisplayRequest {
    /// A layer name reported by the daemon.
    Layer(String),
    /// A synthetic state.
    Synthetic(SyntheticState),
}

impl DisplayRequest {
    /// Convenience constructor for a real layer.
    pub fn layer(name: impl Into<String>) -> Self {
        DisplayRequest::Layer(name.into())
    }

    /// The raw key: the layer name, or the synthetic state's text.
    pub fn key(&self) -> &str {
        match self {
            DisplayRequest::Layer(name) => name,
            DisplayRequest::Synthetic(state) => state.as_str(),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, DisplayRequest::Synthetic(_))
    }
}

impl From<SyntheticState> for DisplayRequest {
    fn from(state: SyntheticState) -> Self {
        DisplayRequest::Synthetic(state)
    }
}

impl fmt::Display for DisplayRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ── Icon cache ────────────────────────────────────────────────────────────────

/// Pre-loaded icon bytes, keyed by layer name.
///
/// Built once after the configuration is loaded.  Layers whose icon failed to
/// load have no entry; they fall back to the default icon at display time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconCache {
    icons: HashMap<String, Vec<u8>>,
}

impl IconCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the icon for `layer`, replacing any previous entry.
    pub fn insert(&mut self, layer: impl Into<String>, icon: Vec<u8>) {
        self.icons.insert(layer.into(), icon);
    }

    pub fn get(&self, layer: &str) -> Option<&[u8]> {
        self.icons.get(layer).map(Vec::as_slice)
    }

    pub fn contains(&self, layer: &str) -> bool {
        self.icons.contains_key(layer)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<u8>)> for IconCache {
    fn from_iter<I: IntoIterator<Item = (K, Vec<u8>)>>(iter: I) -> Self {
        Self {
            icons: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// The text and icon chosen for one display request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDisplay<'a> {
    /// Text for the tray title and the cache file (may be empty).
    pub text: String,
    /// Icon image bytes: a cached layer icon or the default icon.
    pub icon: &'a [u8],
}

/// Resolves the text and icon for `request`.
///
/// # Examples
///
/// ```rust
/// use layer_monitor_core::{resolve_display, Configuration, DisplayRequest, IconCache};
///
/// static DEFAULT_ICON: &[u8] = b"default";
///
/// let config = Configuration::default();
/// let icons = IconCache::new();
/// let shown = resolve_display(&DisplayRequest::layer("nav"), &config, &icons, DEFAULT_ICON);
/// assert_eq!(shown.text, "nav");
/// assert_eq!(shown.icon, DEFAULT_ICON);
/// ```
pub fn resolve_display<'a>(
    request: &DisplayRequest,
    config: &Configuration,
    icons: &'a IconCache,
    default_icon: &'a [u8],
) -> ResolvedDisplay<'a> {
    let key = request.key();

    let Some(layer_config) = config.layer(key) else {
        return ResolvedDisplay {
            text: key.to_string(),
            icon: default_icon,
        };
    };

    let text = if layer_config.label.hidden && !request.is_synthetic() {
        String::new()
    } else {
        layer_config
            .label
            .text
            .clone()
            .unwrap_or_else(|| key.to_string())
    };

    ResolvedDisplay {
        text,
        icon: icons.get(key).unwrap_or(default_icon),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
