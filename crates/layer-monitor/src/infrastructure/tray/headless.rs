//! Headless tray front-end.
//!
//! Used when the binary is built without the `native-tray` feature.  It
//! drains the command channel on the main thread and logs what a real tray
//! would have shown.  There is no menu to click; Quit is Ctrl-C.

use tracing::{debug, info};

use super::{TrayCommand, TrayFrontEnd};

/// Drains `front_end` until every [`ChannelTray`](super::ChannelTray) is dropped.
pub fn run(front_end: TrayFrontEnd) {
    info!("running without a system tray; press Ctrl-C to quit");
    for command in front_end.commands.iter() {
        log_command(&command);
    }
    debug!("tray command channel closed");
}

fn log_command(command: &TrayCommand) {
    match command {
        TrayCommand::SetTitle(title) => debug!("tray title: {title:?}"),
        TrayCommand::SetIcon(icon) => debug!("tray icon: {} bytes", icon.len()),
        TrayCommand::SetTooltip(tooltip) => debug!("tray tooltip: {tooltip:?}"),
        TrayCommand::AddMenuItem(entry) => debug!(
            "tray menu item {:?}: {:?}{}",
            entry.id.as_str(),
            entry.label,
            if entry.enabled { "" } else { " (disabled)" }
        ),
        TrayCommand::AddSeparator => debug!("tray menu separator"),
    }
}
