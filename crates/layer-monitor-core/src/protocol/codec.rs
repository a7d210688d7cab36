//! Line decoder for the daemon's status feed.
//!
//! Wire format: UTF-8 JSON objects separated by `\n`.  Each line is decoded
//! independently; a bad line never affects the lines after it.
//!
//! Decoding distinguishes two failure kinds:
//!
//! - [`DecodeError::Malformed`] – the line is not a JSON object at all
//!   (invalid UTF-8, truncated JSON, a bare number, …).
//! - [`DecodeError::Unsupported`] – a well-formed JSON object that is not a
//!   layer change, e.g. one of the other message kinds the daemon emits.

use serde_json::Value;
use thiserror::Error;

use crate::protocol::messages::LayerChangeEnvelope;

/// Errors that can occur while decoding one line of the status feed.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The line is not a JSON object.
    #[error("malformed status line {line:?}: {source}")]
    Malformed {
        /// The raw line, lossily converted to UTF-8, for diagnostics.
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// The line is a JSON object, but not a `LayerChange` envelope.
    #[error("unsupported status message {line}")]
    Unsupported {
        /// The raw line, lossily converted to UTF-8, for diagnostics.
        line: String,
    },
}

impl DecodeError {
    /// The offending line.
    pub fn line(&self) -> &str {
        match self {
            DecodeError::Malformed { line, .. } | DecodeError::Unsupported { line } => line,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, DecodeError::Malformed { .. })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes one line of the status feed into the new layer name.
///
/// Leading and trailing ASCII whitespace (including the `\n` / `\r\n`
/// terminator) is ignored.
///
/// # Errors
///
/// Returns [`DecodeError`] if the line is not a layer-change notification.
///
/// # Examples
///
/// ```rust
/// use layer_monitor_core::protocol::{decode_line, encode_layer_change};
///
/// let bytes = encode_layer_change("nav").unwrap();
/// assert_eq!(decode_line(&bytes).unwrap(), "nav");
/// assert!(decode_line(br#"{"foo":1}"#).is_err());
/// ```
pub fn decode_line(line: &[u8]) -> Result<String, DecodeError> {
    let trimmed = line.trim_ascii();

    let value: Value = serde_json::from_slice(trimmed).map_err(|source| DecodeError::Malformed {
        line: lossy(trimmed),
        source,
    })?;

    if !value.is_object() {
        return Err(DecodeError::Malformed {
            line: lossy(trimmed),
            source: serde::de::Error::custom(format!(
                "expected a JSON object, found {}",
                json_kind(&value)
            )),
        });
    }

    serde_json::from_value::<LayerChangeEnvelope>(value)
        .map(LayerChangeEnvelope::into_layer)
        .map_err(|_| DecodeError::Unsupported {
            line: lossy(trimmed),
        })
}

/// Encodes a layer-change notification as one newline-terminated line, the
/// way the daemon writes it.
///
/// # Errors
///
/// Returns the `serde_json` error if serialization fails.
pub fn encode_layer_change(layer: &str) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = serde_json::to_vec(&LayerChangeEnvelope::new(layer))?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
