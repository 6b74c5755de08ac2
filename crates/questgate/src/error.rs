//! Unified error type for Questgate.

use questgate_identity::{AuthFailure, ConfigError};
use questgate_protocol::ProtocolError;
use questgate_session::SessionError;
use questgate_transport::TransportError;
use questgate_world::WorldError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `questgate` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum QuestgateError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, unexpected event).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Missing or invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The identity service rejected or failed a request.
    #[error(transparent)]
    Auth(#[from] AuthFailure),

    /// A login or world admission failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The world refused a change or couldn't load its assets.
    #[error(transparent)]
    World(#[from] WorldError),
}
