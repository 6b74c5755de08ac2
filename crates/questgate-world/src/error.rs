//! Error types for the world layer.

use questgate_protocol::PlayerId;
use questgate_transport::ConnectionId;

/// Errors that can occur during world operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A player with this id is already in the roster.
    #[error("player {0} is already in the world")]
    AlreadyJoined(PlayerId),

    /// Another player already joined over this connection.
    #[error("connection {0} already has a player in the world")]
    ConnectionInUse(ConnectionId),

    /// The player is not in the roster.
    #[error("player {0} is not in the world")]
    NotFound(PlayerId),

    /// The world actor has shut down (or its channel is closed).
    #[error("world is unavailable")]
    Unavailable,

    /// The world assets file could not be read or parsed.
    #[error("failed to load world assets from {path}: {reason}")]
    Assets { path: String, reason: String },
}
