//! Error types for the protocol layer.
//!
//! Each crate in Questgate defines its own error enum, so a
//! `ProtocolError` always means "the bytes didn't match the wire format",
//! never a network or identity-service problem.

/// Errors that can occur while encoding or decoding events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: malformed JSON, an unknown `event` name, or a
    /// payload of the wrong shape.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but makes no sense at this point of the flow,
    /// e.g. a logout before any login.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
