//! Message types of the daemon's TCP status feed.
//!
//! kanata writes one JSON object per line.  Several message kinds exist on
//! the wire; the monitor only consumes the layer-change notification:
//!
//! ```json
//! {"LayerChange":{"new":"nav"}}
//! ```

use serde::{Deserialize, Serialize};

/// The outer object of a layer-change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerChangeEnvelope {
    #[serde(rename = "LayerChange")]
    pub layer_change: LayerChange,
}

/// Payload of a layer-change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerChange {
    /// Name of the layer that just became active.
    pub new: String,
}

impl LayerChangeEnvelope {
    pub fn new(layer: impl Into<String>) -> Self {
        Self {
            layer_change: LayerChange { new: layer.into() },
        }
    }

    /// Consumes the envelope, returning the new layer name.
    pub fn into_layer(self) -> String {
        self.layer_change.new
    }
}
