//! ShowLayerUseCase: the layer display state machine.
//!
//! [`LayerDisplay::show`] takes a [`DisplayRequest`] (a real layer name or a
//! synthetic state) and:
//!
//! 1. Skips the request if it names the same real layer as the last one shown.
//!    Synthetic states are never skipped; showing one also clears the
//!    remembered layer, so the next real layer is always redisplayed.
//! 2. Resolves the text and icon with [`resolve_display`] under a read lock on
//!    the shared [`Configuration`].
//! 3. Sets the tray title to `" " + text` and the tray icon.
//! 4. Rewrites the cache file with exactly `text`.
//! 5. Logs the resolved text together with the raw layer key.
//!
//! Tray and cache failures are logged and absorbed: the request is still
//! considered applied, and the next request is processed normally.
//!
//! The tray and the cache file are reached through the [`TrayAdapter`] and
//! [`LayerSink`] traits.  Implementations live in the infrastructure layer.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use layer_monitor_core::{resolve_display, Configuration, DisplayRequest, IconCache};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Tooltip shown on the tray entry.
pub const TRAY_TOOLTIP: &str = "Kanata Layer Monitor";

// ── Tray capability ───────────────────────────────────────────────────────────

/// Error type for tray operations.
#[derive(Debug, Error)]
pub enum TrayError {
    /// The UI thread that owns the tray is no longer running.
    #[error("tray front-end is no longer running")]
    Disconnected,
    /// The platform tray rejected the operation.
    #[error("tray backend error: {0}")]
    Backend(String),
}

/// Identifier of a tray menu item, echoed back in click events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MenuId(pub String);

impl MenuId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A menu item to add to the tray menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: MenuId,
    pub label: String,
    /// Disabled items are informational and cannot be clicked.
    pub enabled: bool,
}

/// User interaction delivered by the tray front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayEvent {
    /// A menu item was clicked.
    MenuClicked(MenuId),
}

/// Platform-agnostic tray capability.
///
/// Implementations must be callable from the pipeline's background thread.
/// Click events flow the other way, on a channel handed out when the adapter
/// is created.
#[cfg_attr(test, mockall::automock)]
pub trait TrayAdapter: Send + Sync {
    /// Sets the text shown next to the tray icon.
    fn set_title(&self, title: &str) -> Result<(), TrayError>;

    /// Sets the tray icon from encoded image bytes (PNG).
    fn set_icon(&self, icon: &[u8]) -> Result<(), TrayError>;

    /// Sets the hover tooltip.
    fn set_tooltip(&self, tooltip: &str) -> Result<(), TrayError>;

    /// Appends an item to the tray menu and returns its id.
    fn add_menu_item(&self, entry: MenuEntry) -> Result<MenuId, TrayError>;

    /// Appends a separator to the tray menu.
    fn add_separator(&self) -> Result<(), TrayError>;
}

// ── Cache-file capability ─────────────────────────────────────────────────────

/// Error type for writes to the current-layer mirror.
#[derive(Debug, Error)]
pub enum CacheWriteError {
    #[error("failed to write current layer to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Destination for the resolved display text (the cache file).
#[cfg_attr(test, mockall::automock)]
pub trait LayerSink: Send + Sync {
    /// Replaces the stored text with `text`.
    fn write_text(&self, text: &str) -> Result<(), CacheWriteError>;
}

// ── Display context ───────────────────────────────────────────────────────────

/// Everything the display state machine reads or talks to.
///
/// Built once at startup and owned by the pipeline for the process lifetime.
#[derive(Clone)]
pub struct DisplayContext {
    /// Shared configuration; read-locked for every resolution.
    pub config: Arc<RwLock<Configuration>>,
    /// Per-layer icons loaded at startup.
    pub icons: Arc<IconCache>,
    /// Icon used when no per-layer icon applies.
    pub default_icon: &'static [u8],
    pub tray: Arc<dyn TrayAdapter>,
    pub sink: Arc<dyn LayerSink>,
}

/// The layer display state machine.
pub struct LayerDisplay {
    ctx: DisplayContext,
    /// Last real layer shown; `None` after a synthetic state.
    current_layer: Option<String>,
}

impl LayerDisplay {
    pub fn new(ctx: DisplayContext) -> Self {
        Self {
            ctx,
            current_layer: None,
        }
    }

    /// The last real layer shown, if the display is not in a synthetic state.
    pub fn current_layer(&self) -> Option<&str> {
        self.current_layer.as_deref()
    }

    /// Shows `request`, unless it repeats the real layer already on display.
    ///
    /// Returns `true` if the tray and cache file were updated.
    pub fn show(&mut self, request: &DisplayRequest) -> bool {
        match request {
            DisplayRequest::Layer(name) => {
                if self.current_layer.as_deref() == Some(name.as_str()) {
                    debug!(layer = %name, "layer unchanged; skipping update");
                    return false;
                }
                self.current_layer = Some(name.clone());
            }
            DisplayRequest::Synthetic(_) => self.current_layer = None,
        }

        self.apply(request);
        true
    }

    fn apply(&self, request: &DisplayRequest) {
        let resolved = {
            let config = self.ctx.config.read().unwrap_or_else(PoisonError::into_inner);
            resolve_display(request, &config, &self.ctx.icons, self.ctx.default_icon)
        };

        if let Err(e) = self.ctx.tray.set_title(&format!(" {}", resolved.text)) {
            warn!("failed to set tray title: {e}");
        }
        if let Err(e) = self.ctx.tray.set_icon(resolved.icon) {
            warn!("failed to set tray icon: {e}");
        }
        if let Err(e) = self.ctx.sink.write_text(&resolved.text) {
            warn!("{e}");
        }

        info!("layer changed to \"{}\" ({})", resolved.text, request);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
