//! The hub: a registry of live connections that server events are
//! delivered through.
//!
//! Each connection handler registers its connection and gets back the
//! receiving end of an unbounded queue; a writer task drains that queue
//! into the socket. Emitting or broadcasting only encodes the event and
//! pushes bytes onto queues, so a slow client never blocks a join.

use std::collections::HashMap;
use std::sync::Arc;

use questgate_protocol::{Codec, JsonCodec, ServerEvent};
use questgate_session::Notifier;
use questgate_transport::{ConnectionId, TransportError};
use tokio::sync::{RwLock, mpsc};

/// Outgoing frame queue of one connection.
pub(crate) type Outbox = mpsc::UnboundedReceiver<Vec<u8>>;

/// Live connections, keyed by connection id.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone, Default)]
pub struct Hub {
    connections: Arc<RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<Vec<u8>>>>>,
    codec: JsonCodec,
}

impl Hub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection and returns its outgoing frame queue.
    ///
    /// Registering an id twice replaces the earlier queue, which then
    /// closes.
    pub(crate) async fn register(&self, connection: ConnectionId) -> Outbox {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.write().await.insert(connection, tx);
        tracing::debug!(%connection, "connection registered");
        rx
    }

    /// Forgets a connection. Frames already queued are still written.
    pub(crate) async fn unregister(&self, connection: ConnectionId) {
        if self.connections.write().await.remove(&connection).is_some() {
            tracing::debug!(%connection, "connection unregistered");
        }
    }

    /// Number of registered connections.
    pub(crate) async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    fn encode(&self, event: &ServerEvent) -> Result<Vec<u8>, TransportError> {
        // Every ServerEvent is plain JSON data, so this only fails on a bug.
        self.codec
            .encode(event)
            .map_err(|e| TransportError::SendFailed(std::io::Error::other(e)))
    }
}

impl Notifier for Hub {
    async fn emit(
        &self,
        connection: ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), TransportError> {
        let frame = self.encode(event)?;
        let connections = self.connections.read().await;
        let sender = connections
            .get(&connection)
            .ok_or_else(|| TransportError::ConnectionClosed(connection.to_string()))?;

        sender
            .send(frame)
            .map_err(|_| TransportError::ConnectionClosed(connection.to_string()))?;
        tracing::debug!(%connection, event = event.name(), "event queued");
        Ok(())
    }

    async fn broadcast(&self, event: &ServerEvent) -> Result<(), TransportError> {
        let frame = self.encode(event)?;

        let closed: Vec<ConnectionId> = {
            let connections = self.connections.read().await;
            connections
                .iter()
                .filter(|(_, sender)| sender.send(frame.clone()).is_err())
                .map(|(id, _)| *id)
                .collect()
        };

        if !closed.is_empty() {
            let mut connections = self.connections.write().await;
            for id in &closed {
                connections.remove(id);
            }
            tracing::debug!(pruned = closed.len(), "dropped closed connections");
        }

        tracing::debug!(event = event.name(), "event broadcast");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use questgate_protocol::{Player, PlayerId, Profile};
    use serde_json::{Value, json};

    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn roster() -> ServerEvent {
        ServerEvent::Joined(vec![Player::new(conn(1), Profile::new(PlayerId(1), "alice"))])
    }

    fn parse(frame: &[u8]) -> Value {
        serde_json::from_slice(frame).unwrap()
    }

    #[tokio::test]
    async fn test_emit_reaches_only_target() {
        let hub = Hub::new();
        let mut a = hub.register(conn(1)).await;
        let mut b = hub.register(conn(2)).await;

        hub.emit(conn(1), &roster()).await.unwrap();

        let frame = a.try_recv().unwrap();
        assert_eq!(parse(&frame)["event"], json!("player:joined"));
        assert!(b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_emit_unknown_connection_is_closed_error() {
        let hub = Hub::new();

        let err = hub.emit(conn(9), &roster()).await.unwrap_err();

        assert!(matches!(err, TransportError::ConnectionClosed(_)));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_everyone() {
        let hub = Hub::new();
        let mut a = hub.register(conn(1)).await;
        let mut b = hub.register(conn(2)).await;

        hub.broadcast(&roster()).await.unwrap();

        assert_eq!(parse(&a.try_recv().unwrap())["data"][0]["name"], json!("alice"));
        assert_eq!(parse(&b.try_recv().unwrap())["data"][0]["name"], json!("alice"));
    }

    #[tokio::test]
    async fn test_broadcast_prunes_dropped_receivers() {
        let hub = Hub::new();
        let _a = hub.register(conn(1)).await;
        drop(hub.register(conn(2)).await);

        hub.broadcast(&roster()).await.unwrap();

        assert_eq!(hub.len().await, 1);
    }

    #[tokio::test]
    async fn test_unregister_keeps_queued_frames() {
        let hub = Hub::new();
        let mut a = hub.register(conn(1)).await;
        hub.emit(conn(1), &roster()).await.unwrap();

        hub.unregister(conn(1)).await;

        assert!(a.recv().await.is_some());
        assert!(a.recv().await.is_none());
        assert_eq!(hub.len().await, 0);
    }
}
