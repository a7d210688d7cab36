//! Domain entities for Kanata Layer Monitor.
//!
//! This module contains pure logic with no infrastructure dependencies.
//! Loading the configuration file, reading icon files, and talking to the
//! tray all happen in the application crate; the types here only describe
//! *what* was configured and *how* a layer is presented.

/// Configuration schema and default values.
pub mod config;

/// Layer display resolution (label, icon, hidden rule).
///
/// See [`display::resolve_display`] for the main entry point.
pub mod display;
