//! Protocol module containing the status-feed message types and the line decoder.

pub mod codec;
pub mod messages;

pub use codec::{decode_line, encode_layer_change, DecodeError};
pub use messages::{LayerChange, LayerChangeEnvelope};
