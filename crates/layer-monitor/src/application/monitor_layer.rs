//! MonitorLayerUseCase: turns raw status lines into display requests.
//!
//! This is the caller side of the decoder.  Decode failures never leave this
//! module:
//!
//! | Line                                  | Effect                              |
//! |---------------------------------------|-------------------------------------|
//! | blank                                 | ignored                             |
//! | `{"LayerChange":{"new":"nav"}}`       | show `nav` (skipped if unchanged)   |
//! | other JSON object (other message kind)| logged at `debug`, ignored          |
//! | not a JSON object                     | logged at `warn`, show `"N/A"`      |

use layer_monitor_core::{decode_line, DecodeError, DisplayRequest, SyntheticState};
use tracing::{debug, warn};

use crate::application::show_layer::LayerDisplay;

/// What happened to one status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// A layer change was shown.
    Displayed,
    /// A layer change repeated the layer already on display.
    Unchanged,
    /// The line was blank or an unsupported message kind.
    Ignored,
    /// The line was not valid JSON; `"N/A"` was shown.
    Invalid,
}

/// Feeds decoded status lines into the display state machine.
pub struct LayerMonitor {
    display: LayerDisplay,
}

impl LayerMonitor {
    pub fn new(display: LayerDisplay) -> Self {
        Self { display }
    }

    pub fn display(&self) -> &LayerDisplay {
        &self.display
    }

    /// Shows a synthetic state such as `"..."` at boot or `"Error"`.
    pub fn show_state(&mut self, state: SyntheticState) {
        self.display.show(&state.into());
    }

    /// Handles one line read from the daemon.
    pub fn handle_line(&mut self, line: &[u8]) -> LineOutcome {
        if line.trim_ascii().is_empty() {
            return LineOutcome::Ignored;
        }

        match decode_line(line) {
            Ok(layer) => {
                if self.display.show(&DisplayRequest::Layer(layer)) {
                    LineOutcome::Displayed
                } else {
                    LineOutcome::Unchanged
                }
            }
            Err(e @ DecodeError::Unsupported { .. }) => {
                debug!("{e}");
                LineOutcome::Ignored
            }
            Err(e @ DecodeError::Malformed { .. }) => {
                warn!("invalid JSON from daemon: {e}");
                self.show_state(SyntheticState::InvalidMessage);
                LineOutcome::Invalid
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
