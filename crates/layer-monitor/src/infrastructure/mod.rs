//! Infrastructure layer for the monitor.
//!
//! Contains the OS-facing adapters: files on disk, the TCP connection to the
//! daemon, and the tray front-ends.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `layer_monitor_core`, but MUST NOT be imported by the `application` layer
//! (tests excepted).
//!
//! # Sub-modules
//!
//! - **`storage`** – Configuration discovery and loading, the per-layer icon
//!   cache, and the current-layer cache file.
//!
//! - **`network`** – The connection loop: dial, stream lines, reconnect or
//!   give up according to the configured policy.
//!
//! - **`tray`** – A thread-safe [`TrayAdapter`](crate::application::show_layer::TrayAdapter)
//!   that forwards every call to the UI thread, plus the front-ends that run
//!   on that thread.

pub mod network;
pub mod storage;
pub mod tray;
