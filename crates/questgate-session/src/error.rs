//! Error types for the session layer.

use questgate_identity::AuthFailure;
use questgate_world::WorldError;

/// Errors that can occur while logging a player in or admitting them
/// to the world.
///
/// Transport failures are deliberately absent: notifications are
/// best-effort and never turn a join into an error.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// An identity call failed (bad credentials, rejected token,
    /// unreachable service, unusable response).
    #[error(transparent)]
    Auth(#[from] AuthFailure),

    /// The world refused the roster change (duplicate player, unknown
    /// player, world stopped).
    #[error(transparent)]
    World(#[from] WorldError),
}
