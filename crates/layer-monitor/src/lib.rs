//! layer-monitor library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the monitor do?
//!
//! kanata (a keyboard remapping daemon) can publish a TCP status feed.  The
//! monitor:
//!
//! 1. Loads `~/.config/kanata-layer-monitor/config.yaml` (defaults if absent)
//!    and pre-loads the per-layer icons it names.
//! 2. Creates a tray entry with an informational "Listening host:port" item
//!    and a "Quit" item.
//! 3. Connects to the daemon and reads newline-delimited JSON.
//! 4. For every `{"LayerChange":{"new":"<layer>"}}` line, updates the tray
//!    title and icon and rewrites `~/.cache/kanata-layer-monitor/current-layer`.
//! 5. Shows `"Error"` when the daemon cannot be reached and `"N/A"` when it
//!    sends something that is not JSON.
//!
//! # Tray front-ends
//!
//! **The real system tray is behind the `native-tray` feature**:
//!
//! ```text
//! cargo run -p layer-monitor --features native-tray
//! ```
//!
//! A default build has no tray icon and no menu.  It runs the headless
//! front-end, which only logs what the tray would show; quit it with
//! Ctrl-C.  On Linux the feature needs the GTK 3 and libxdo development
//! packages.

/// Application layer: the display state machine and the line pipeline.
pub mod application;

/// Infrastructure layer: config/icon/cache files, TCP connection, tray front-ends.
pub mod infrastructure;
