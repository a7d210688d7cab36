//! Configuration schema for Kanata Layer Monitor.
//!
//! The configuration is read once at startup from
//! `~/.config/kanata-layer-monitor/config.yaml` (or `.yml`).  Example:
//!
//! ```yaml
//! host: 127.0.0.1
//! port: 4444
//! log_level: info
//!
//! reconnect:
//!   enabled: true
//!   dial_attempts: 1
//!   retry_delay_ms: 1000
//!
//! layers:
//!   base:
//!     label:
//!       text: "B"
//!   nav:
//!     icon:
//!       path: icons/nav.png
//!   mouse:
//!     label:
//!       hidden: true
//!     icon:
//!       path: icons/mouse.png
//! ```
//!
//! # Serde default values
//!
//! Every struct is annotated with `#[serde(default)]`, so any key may be left
//! out of the file.  After parsing, [`Configuration::with_defaults`] replaces
//! zero values (`host: ""`, `port: 0`) with [`DEFAULT_HOST`] and
//! [`DEFAULT_PORT`]; an explicitly empty host is treated the same as a
//! missing one.
//!
//! Icon paths are relative to the directory that contains the configuration
//! file.  Resolving and reading them is the job of the application crate.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Host the daemon's TCP status feed listens on when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Port the daemon's TCP status feed listens on when none is configured.
pub const DEFAULT_PORT: u16 = 4444;

/// Tracing filter directive used when none is configured.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Upper bound for the doubling redial delay.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Hostname or IP address of the daemon's status feed.
    pub host: String,
    /// TCP port of the daemon's status feed.
    pub port: u16,
    /// `tracing` filter directive, e.g. `"info"` or `"layer_monitor=debug"`.
    pub log_level: String,
    /// What the connection loop does after a failed dial or a closed stream.
    pub reconnect: ReconnectPolicy,
    /// Per-layer display overrides, keyed by the layer name kanata reports.
    pub layers: BTreeMap<String, LayerConfig>,
}

/// Display override for one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub label: LabelConfig,
    pub icon: IconConfig,
}

/// Label override: replacement text, or hide the text entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Text shown instead of the layer name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Show only the icon for this layer.
    pub hidden: bool,
}

/// Icon override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    /// Image path, relative to the configuration file's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Reconnect behaviour of the connection loop.
///
/// The defaults give up after the first failed dial (the tray then shows
/// `"Error"`), and redial immediately when an established stream ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    /// Redial after the daemon closes the stream.  When `false`, a closed
    /// stream shows `"Error"` and stops the loop.
    pub enabled: bool,
    /// Consecutive failed dials before giving up.  `0` retries forever.
    pub dial_attempts: u32,
    /// Delay before the first redial after a failed dial, in milliseconds.
    /// Doubles with every further failure, capped at [`MAX_RETRY_DELAY`].
    pub retry_delay_ms: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for Configuration {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            reconnect: ReconnectPolicy::default(),
            layers: BTreeMap::new(),
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            dial_attempts: 1,
            retry_delay_ms: 1000,
        }
    }
}

impl Configuration {
    /// Replaces zero-valued fields with their defaults.
    ///
    /// `serde(default)` only covers keys that are *absent*; this also covers
    /// keys that are present but empty (`host: ""`, `port: 0`).
    pub fn with_defaults(mut self) -> Self {
        if self.host.trim().is_empty() {
            self.host = DEFAULT_HOST.to_string();
        }
        if self.port == 0 {
            self.port = DEFAULT_PORT;
        }
        if self.log_level.trim().is_empty() {
            self.log_level = DEFAULT_LOG_LEVEL.to_string();
        }
        self
    }

    /// Returns the `host:port` string shown in the tray menu.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Looks up the display override for `layer`.
    pub fn layer(&self, layer: &str) -> Option<&LayerConfig> {
        self.layers.get(layer)
    }

    /// Iterates over `(layer, icon path)` for every layer that has an icon.
    pub fn icon_paths(&self) -> impl Iterator<Item = (&str, &str)> {
        self.layers.iter().filter_map(|(layer, cfg)| {
            cfg.icon
                .path
                .as_deref()
                .map(|path| (layer.as_str(), path))
        })
    }
}

impl ReconnectPolicy {
    /// Returns `true` if another dial may be attempted after
    /// `consecutive_failures` failed dials.
    pub fn allows_redial(&self, consecutive_failures: u32) -> bool {
        self.dial_attempts == 0 || consecutive_failures < self.dial_attempts
    }

    /// Delay to wait before redialling after `consecutive_failures` failed dials.
    pub fn retry_delay(&self, consecutive_failures: u32) -> Duration {
        let base = Duration::from_millis(self.retry_delay_ms);
        let shift = consecutive_failures.saturating_sub(1).min(16);
        base.saturating_mul(1 << shift).min(MAX_RETRY_DELAY)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
