//! Notification hook for telling clients about world changes.
//!
//! The session layer decides WHAT to announce and WHEN (a welcome
//! snapshot to the joining connection, the new roster to everyone). It
//! doesn't know how connections are stored or how frames are written;
//! that's the [`Notifier`]'s job.
//!
//! The server wires in a hub over live WebSocket connections; tests wire
//! in a recorder that just remembers what was sent.

use questgate_protocol::ServerEvent;
use questgate_transport::{ConnectionId, TransportError};

/// Delivers server events to connected clients.
///
/// Delivery is best-effort from the caller's point of view: a returned
/// error is logged by the session layer and never fails a login or join.
///
/// # Trait bounds
///
/// - `Send + Sync` → shared by every connection task.
/// - `'static` → lives as long as the server.
pub trait Notifier: Send + Sync + 'static {
    /// Delivers `event` to exactly one connection.
    fn emit(
        &self,
        connection: ConnectionId,
        event: &ServerEvent,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// Delivers `event` to every connection.
    fn broadcast(
        &self,
        event: &ServerEvent,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;
}
