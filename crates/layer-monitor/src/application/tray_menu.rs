//! Initial tray contents and Quit handling.
//!
//! The tray menu is fixed:
//!
//! ```text
//! Listening 127.0.0.1:4444   (disabled)
//! ─────────────────────────
//! Quit
//! ```

use layer_monitor_core::Configuration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::application::show_layer::{
    MenuEntry, MenuId, TrayAdapter, TrayError, TrayEvent, TRAY_TOOLTIP,
};

/// Menu id of the disabled "Listening host:port" item.
pub const LISTEN_INFO_MENU_ID: &str = "listen-info";

/// Menu id of the Quit item.
pub const QUIT_MENU_ID: &str = "quit";

/// Why [`wait_for_quit`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitTrigger {
    /// The user clicked Quit.
    MenuClicked,
    /// The tray front-end went away; nothing can trigger Quit any more.
    TrayClosed,
}

/// Sets the default icon and tooltip and builds the tray menu.
///
/// Returns the id of the Quit item.
///
/// # Errors
///
/// Returns [`TrayError`] if the tray rejects any of the operations.
pub fn install_tray_menu(
    tray: &dyn TrayAdapter,
    config: &Configuration,
    default_icon: &[u8],
) -> Result<MenuId, TrayError> {
    tray.set_icon(default_icon)?;
    tray.set_tooltip(TRAY_TOOLTIP)?;

    let info = format!("Listening {}", config.listen_address());
    tray.add_menu_item(MenuEntry {
        id: MenuId::new(LISTEN_INFO_MENU_ID),
        label: info,
        enabled: false,
    })?;
    tray.add_separator()?;

    tray.add_menu_item(MenuEntry {
        id: MenuId::new(QUIT_MENU_ID),
        label: "Quit".to_string(),
        enabled: true,
    })
}

/// Waits until the Quit item is clicked.  Clicks on other items are ignored.
pub async fn wait_for_quit(
    events: &mut UnboundedReceiver<TrayEvent>,
    quit: &MenuId,
) -> QuitTrigger {
    while let Some(event) = events.recv().await {
        match event {
            TrayEvent::MenuClicked(id) if &id == quit => return QuitTrigger::MenuClicked,
            TrayEvent::MenuClicked(id) => debug!("ignoring click on menu item {}", id.as_str()),
        }
    }
    QuitTrigger::TrayClosed
}

/// Cleanup hook run right before the process exits.
pub fn on_exit() {
    info!("Shutting down");
}

// ── Tests ─────────────────────────────────────────────────────────────────────
