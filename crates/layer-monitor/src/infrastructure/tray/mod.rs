//! Tray adapter and front-ends.
//!
//! Platform tray toolkits must be driven from the thread that owns the UI
//! event loop, while layer updates arrive on the pipeline's background
//! thread.  [`ChannelTray`] bridges the two: it implements
//! [`TrayAdapter`] by turning every call into a [`TrayCommand`] on a
//! channel, and exactly one front-end drains that channel on the main thread.
//!
//! ```text
//! pipeline thread                       main thread
//! ───────────────                       ───────────
//! LayerDisplay ─► ChannelTray ─► TrayCommand ─► front-end (headless / native)
//!                                                   │
//! wait_for_quit ◄──────────── TrayEvent ◄───────────┘ (menu clicks)
//! ```
//!
//! Front-ends:
//! - [`headless`] – logs every command; used when the `native-tray` feature
//!   is disabled, which is the default.  No icon or Quit item appears.
//! - `native` – a real system tray built on `tray-icon` (feature `native-tray`).

use std::sync::mpsc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::application::show_layer::{MenuEntry, MenuId, TrayAdapter, TrayError, TrayEvent};

pub mod headless;
pub mod mock;
#[cfg(feature = "native-tray")]
pub mod native;

/// Icon bundled with the binary, shown whenever no per-layer icon applies.
pub static DEFAULT_ICON: &[u8] = include_bytes!("../../../assets/icon.png");

/// One tray operation, executed on the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayCommand {
    SetTitle(String),
    SetIcon(Vec<u8>),
    SetTooltip(String),
    AddMenuItem(MenuEntry),
    AddSeparator,
}

/// The UI-thread side of the tray channel.
#[derive(Debug)]
pub struct TrayFrontEnd {
    /// Commands issued through [`ChannelTray`], in call order.
    pub commands: mpsc::Receiver<TrayCommand>,
    /// Sink for user interaction (menu clicks).
    pub events: UnboundedSender<TrayEvent>,
}

/// Thread-safe [`TrayAdapter`] that forwards calls to the UI thread.
#[derive(Debug, Clone)]
pub struct ChannelTray {
    commands: mpsc::Sender<TrayCommand>,
}

/// Creates a connected adapter / front-end pair plus the click-event receiver.
pub fn channel() -> (ChannelTray, TrayFrontEnd, UnboundedReceiver<TrayEvent>) {
    let (command_tx, command_rx) = mpsc::channel();
    let (event_tx, event_rx) = unbounded_channel();
    (
        ChannelTray {
            commands: command_tx,
        },
        TrayFrontEnd {
            commands: command_rx,
            events: event_tx,
        },
        event_rx,
    )
}

impl ChannelTray {
    fn send(&self, command: TrayCommand) -> Result<(), TrayError> {
        self.commands
            .send(command)
            .map_err(|_| TrayError::Disconnected)
    }
}

impl TrayAdapter for ChannelTray {
    fn set_title(&self, title: &str) -> Result<(), TrayError> {
        self.send(TrayCommand::SetTitle(title.to_string()))
    }

    fn set_icon(&self, icon: &[u8]) -> Result<(), TrayError> {
        self.send(TrayCommand::SetIcon(icon.to_vec()))
    }

    fn set_tooltip(&self, tooltip: &str) -> Result<(), TrayError> {
        self.send(TrayCommand::SetTooltip(tooltip.to_string()))
    }

    fn add_menu_item(&self, entry: MenuEntry) -> Result<MenuId, TrayError> {
        let id = entry.id.clone();
        self.send(TrayCommand::AddMenuItem(entry))?;
        Ok(id)
    }

    fn add_separator(&self) -> Result<(), TrayError> {
        self.send(TrayCommand::AddSeparator)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
