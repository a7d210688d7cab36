//! # layer-monitor-core
//!
//! Shared library for Kanata Layer Monitor containing the configuration model,
//! the layer display resolution rules, and the status-feed decoder.
//!
//! This crate has zero dependencies on OS APIs, UI toolkits, or network
//! sockets, so every rule in it can be tested without a tray or a daemon.
//!
//! # Architecture overview
//!
//! Kanata Layer Monitor is a tray client for the kanata keyboard remapper.
//! kanata publishes a newline-delimited JSON status feed over TCP; every time
//! the active layer changes it sends `{"LayerChange":{"new":"<layer>"}}`.  The
//! monitor shows the current layer as the tray title and icon and mirrors the
//! title text to a cache file so shell prompts and status bars can read it.
//!
//! - **`domain`** – The configuration schema (host, port, per-layer label and
//!   icon overrides) and the pure function that turns a layer name into the
//!   text and icon to display.
//!
//! - **`protocol`** – The wire envelope types and the line decoder.

pub mod domain;
pub mod protocol;

pub use domain::config::{Configuration, IconConfig, LabelConfig, LayerConfig, ReconnectPolicy};
pub use domain::display::{
    resolve_display, DisplayRequest, IconCache, ResolvedDisplay, SyntheticState,
};
pub use protocol::codec::{decode_line, encode_layer_change, DecodeError};
