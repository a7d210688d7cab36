//! Application layer for the monitor.
//!
//! Contains the use cases that turn status lines into tray updates.  They
//! talk to the outside world only through the [`show_layer::TrayAdapter`]
//! and [`show_layer::LayerSink`] traits, so every rule here is testable
//! with in-memory fakes.
//!
//! # Sub-modules
//!
//! - **`show_layer`** – The display state machine: resolve, de-duplicate,
//!   update the tray, mirror to the cache file.
//! - **`monitor_layer`** – Decoder caller policy: one status line in, at most
//!   one display request out.
//! - **`tray_menu`** – Initial tray contents and the Quit click handling.

pub mod monitor_layer;
pub mod show_layer;
pub mod tray_menu;
