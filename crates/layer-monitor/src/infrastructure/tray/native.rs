//! System tray front-end built on `tray-icon`.
//!
//! The tray icon is created on the main thread and then driven by a short
//! periodic pump that applies queued [`TrayCommand`]s and forwards menu
//! clicks.  On Linux the pump runs inside the GTK main loop; on Windows and
//! macOS it runs from a `winit` event loop.

use std::sync::mpsc::TryRecvError;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};
use tray_icon::menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

use super::{TrayCommand, TrayFrontEnd};
use crate::application::show_layer::{MenuId, TrayEvent, TRAY_TOOLTIP};

/// How often queued commands and menu clicks are processed.
const PUMP_INTERVAL: Duration = Duration::from_millis(50);

/// Error type for the native tray front-end.
#[derive(Debug, Error)]
pub enum NativeTrayError {
    #[error("failed to initialise the UI toolkit: {0}")]
    Init(String),
    #[error("failed to create tray icon: {0}")]
    Create(#[from] tray_icon::Error),
    #[error("failed to update tray menu: {0}")]
    Menu(#[from] tray_icon::menu::Error),
    #[error("failed to decode tray icon image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("invalid tray icon image: {0}")]
    BadIcon(#[from] tray_icon::BadIcon),
}

/// Owns the platform tray icon and its menu.  Lives on the main thread.
struct NativeTray {
    front_end: TrayFrontEnd,
    menu: Menu,
    icon: TrayIcon,
}

impl NativeTray {
    fn new(front_end: TrayFrontEnd) -> Result<Self, NativeTrayError> {
        let menu = Menu::new();
        let icon = TrayIconBuilder::new()
            .with_menu(Box::new(menu.clone()))
            .with_tooltip(TRAY_TOOLTIP)
            .build()?;
        debug!("native tray icon created");
        Ok(Self {
            front_end,
            menu,
            icon,
        })
    }

    /// Applies pending commands and forwards pending clicks.
    ///
    /// Returns `false` once the command channel has closed.
    fn pump(&mut self) -> bool {
        let mut open = true;
        loop {
            match self.front_end.commands.try_recv() {
                Ok(command) => {
                    if let Err(e) = self.apply(command) {
                        warn!("tray update failed: {e}");
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    open = false;
                    break;
                }
            }
        }

        while let Ok(event) = MenuEvent::receiver().try_recv() {
            let id = MenuId::new(event.id.0);
            debug!("menu item {} clicked", id.as_str());
            if self.front_end.events.send(TrayEvent::MenuClicked(id)).is_err() {
                debug!("no listener for tray clicks");
            }
        }

        open
    }

    fn apply(&mut self, command: TrayCommand) -> Result<(), NativeTrayError> {
        match command {
            TrayCommand::SetTitle(title) => self.icon.set_title(Some(title)),
            TrayCommand::SetIcon(bytes) => self.icon.set_icon(Some(decode_icon(&bytes)?))?,
            TrayCommand::SetTooltip(tooltip) => self.icon.set_tooltip(Some(tooltip))?,
            TrayCommand::AddMenuItem(entry) => {
                let item = MenuItem::with_id(entry.id.0, &entry.label, entry.enabled, None);
                self.menu.append(&item)?;
            }
            TrayCommand::AddSeparator => self.menu.append(&PredefinedMenuItem::separator())?,
        }
        Ok(())
    }
}

/// Decodes PNG (or any format `image` was built with) into a tray icon.
fn decode_icon(bytes: &[u8]) -> Result<Icon, NativeTrayError> {
    let rgba = image::load_from_memory(bytes)?.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Icon::from_rgba(rgba.into_raw(), width, height)?)
}

/// Runs the tray on the calling thread until every adapter is dropped.
#[cfg(target_os = "linux")]
pub fn run(front_end: TrayFrontEnd) -> Result<(), NativeTrayError> {
    use gtk::glib::{self, ControlFlow};

    gtk::init().map_err(|e| NativeTrayError::Init(e.to_string()))?;
    let mut tray = NativeTray::new(front_end)?;

    glib::timeout_add_local(PUMP_INTERVAL, move || {
        if tray.pump() {
            ControlFlow::Continue
        } else {
            gtk::main_quit();
            ControlFlow::Break
        }
    });

    gtk::main();
    Ok(())
}

/// Runs the tray on the calling thread until every adapter is dropped.
#[cfg(not(target_os = "linux"))]
pub fn run(front_end: TrayFrontEnd) -> Result<(), NativeTrayError> {
    use winit::event_loop::EventLoop;

    let event_loop = EventLoop::new().map_err(|e| NativeTrayError::Init(e.to_string()))?;
    let mut app = app::TrayApp::new(front_end);
    event_loop
        .run_app(&mut app)
        .map_err(|e| NativeTrayError::Init(e.to_string()))?;
    app.into_result()
}

#[cfg(not(target_os = "linux"))]
mod app {
    use std::time::Instant;

    use winit::application::ApplicationHandler;
    use winit::event::{StartCause, WindowEvent};
    use winit::event_loop::{ActiveEventLoop, ControlFlow};
    use winit::window::WindowId;

    use super::{NativeTray, NativeTrayError, TrayFrontEnd, PUMP_INTERVAL};

    /// `winit` handler that owns the tray once the event loop has started.
    pub(super) struct TrayApp {
        front_end: Option<TrayFrontEnd>,
        tray: Option<NativeTray>,
        error: Option<NativeTrayError>,
    }

    impl TrayApp {
        pub(super) fn new(front_end: TrayFrontEnd) -> Self {
            Self {
                front_end: Some(front_end),
                tray: None,
                error: None,
            }
        }

        pub(super) fn into_result(self) -> Result<(), NativeTrayError> {
            self.error.map_or(Ok(()), Err)
        }
    }

    impl ApplicationHandler for TrayApp {
        fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
            // macOS only allows the status item once the loop is running.
            if !matches!(cause, StartCause::Init) {
                return;
            }
            if let Some(front_end) = self.front_end.take() {
                match NativeTray::new(front_end) {
                    Ok(tray) => self.tray = Some(tray),
                    Err(e) => {
                        self.error = Some(e);
                        event_loop.exit();
                    }
                }
            }
        }

        fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

        fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}

        fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
            if let Some(tray) = self.tray.as_mut() {
                if !tray.pump() {
                    event_loop.exit();
                    return;
                }
            }
            event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + PUMP_INTERVAL));
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
