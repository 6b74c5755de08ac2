//! Codec trait and the JSON implementation.
//!
//! A "codec" (coder/decoder) converts between Rust values and frame bytes.
//! Everything above the transport talks in [`ClientEvent`] and
//! [`ServerEvent`](crate::ServerEvent); the codec is the only place that
//! knows they become JSON text.
//!
//! [`ClientEvent`]: crate::ClientEvent

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode values to bytes and decode bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync` → one codec instance is shared by every connection
///   task, and Tokio may run those tasks on any worker thread.
/// - `'static` → the codec owns everything it needs and can live inside
///   the long-lived server state.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Game clients speak `{"event": "...", "data": ...}` JSON frames, so this
/// is the codec the server runs with.
///
/// ## Example
///
/// ```rust
/// use questgate_protocol::{ClientEvent, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let event: ClientEvent = codec
///     .decode(br#"{"event":"player:login","data":{"user":"alice","pass":"x"}}"#)
///     .unwrap();
/// assert!(matches!(event, ClientEvent::Login(_)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
