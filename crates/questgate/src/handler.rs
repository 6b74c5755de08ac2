//! Per-connection handler: login, world admission, and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register with the hub → start the writer task
//!   2. Receive `player:login` → run the login while watching the socket
//!   3. Admit the player → `player:login` to them, `player:joined` to all
//!   4. Loop: receive events until `player:logout`, close, or idle timeout
//!      (any frame, pings included, keeps the connection alive)
//!   5. Remove the player, end the identity session, unregister

use std::sync::Arc;

use questgate_identity::{AuthFailureKind, IdentityProvider};
use questgate_protocol::{
    AccessToken, ClientEvent, Codec, Credentials, LOGIN_EVENT, Player, PlayerId, ProtocolError,
    ServerEvent,
};
use questgate_session::{LoginOutcome, Notifier, SessionError};
use questgate_transport::{Connection, ConnectionId, WebSocketConnection};
use questgate_world::WorldError;

use crate::QuestgateError;
use crate::hub::{Hub, Outbox};
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<P: IdentityProvider>(
    conn: WebSocketConnection,
    state: Arc<ServerState<P>>,
) -> Result<(), QuestgateError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let hub = state.service.notifier();
    let outbox = hub.register(conn_id).await;
    let writer = tokio::spawn(write_frames(Arc::clone(&conn), outbox));

    let result = serve(&conn, &state).await;

    // Unregistering drops the last sender, so the writer flushes whatever
    // is still queued (e.g. an error event) and then stops.
    hub.unregister(conn_id).await;
    let connections = hub.len().await;
    tracing::debug!(%conn_id, connections, "connection finished");
    if let Err(e) = writer.await {
        tracing::debug!(%conn_id, error = %e, "writer task failed");
    }
    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close failed");
    }

    result
}

/// Drains a connection's outgoing queue into the socket.
async fn write_frames(conn: Arc<WebSocketConnection>, mut outbox: Outbox) {
    while let Some(frame) = outbox.recv().await {
        if let Err(e) = conn.send(&frame).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed, stopping writer");
            break;
        }
    }
}

/// Runs steps 2–5 for one connection.
async fn serve<P: IdentityProvider>(
    conn: &WebSocketConnection,
    state: &ServerState<P>,
) -> Result<(), QuestgateError> {
    let conn_id = conn.id();
    let hub = state.service.notifier();

    // --- Step 2: Login ---
    let credentials = match await_login(conn, state).await {
        Ok(Some(credentials)) => credentials,
        Ok(None) => {
            tracing::debug!(%conn_id, "closed before login");
            return Ok(());
        }
        Err(e) => {
            send_error(hub, conn_id, 400, &e.to_string()).await;
            return Err(e);
        }
    };

    // If the client goes away or logs out mid-login, the login future is
    // dropped and the world is never touched.
    let outcome = tokio::select! {
        outcome = state.service.login(&credentials) => outcome,
        () = wait_for_cancel(conn, state) => {
            tracing::info!(%conn_id, "client cancelled login");
            return Ok(());
        }
    };
    let LoginOutcome { player, token } = match outcome {
        Ok(outcome) => outcome,
        Err(failure) => {
            // The detail may name internal hosts; the client gets a fixed text.
            tracing::info!(%conn_id, kind = %failure.kind(), error = %failure, "login rejected");
            let kind = failure.kind();
            send_error(hub, conn_id, failure_code(kind), failure_message(kind)).await;
            return Err(failure.into());
        }
    };

    // --- Step 3: Admission ---
    let player_id = player.id;
    if let Err(e) = state.service.add_player(Player::new(conn_id, player)).await {
        tracing::info!(%conn_id, %player_id, error = %e, "world refused player");
        send_error(hub, conn_id, session_code(&e), session_message(&e)).await;
        end_session(state, &token).await;
        return Err(e.into());
    }

    // --- Step 4: Event loop ---
    let result = event_loop(conn, state, player_id, conn_id).await;

    // --- Step 5: Cleanup ---
    if let Err(e) = state.service.remove_player(player_id).await {
        tracing::debug!(%player_id, error = %e, "remove on disconnect failed");
    }
    end_session(state, &token).await;

    result
}

/// Waits (bounded) for the first frame and expects it to be a login.
///
/// Returns `Ok(None)` if the client closed first.
async fn await_login<P: IdentityProvider>(
    conn: &WebSocketConnection,
    state: &ServerState<P>,
) -> Result<Option<Credentials>, QuestgateError> {
    let data = match tokio::time::timeout(state.login_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => return Ok(None),
        Ok(Err(e)) => return Err(QuestgateError::Transport(e)),
        Err(_) => {
            return Err(ProtocolError::InvalidMessage("login timed out".into()).into());
        }
    };

    match state.codec.decode::<ClientEvent>(&data)? {
        ClientEvent::Login(credentials) => Ok(Some(credentials)),
        ClientEvent::Logout => Err(ProtocolError::InvalidMessage(format!(
            "first event must be {LOGIN_EVENT}"
        ))
        .into()),
    }
}

/// Resolves once the client closes the connection (or it breaks) or sends
/// `player:logout`. Other frames arriving meanwhile are discarded.
async fn wait_for_cancel<P: IdentityProvider>(conn: &WebSocketConnection, state: &ServerState<P>) {
    while let Ok(Some(data)) = conn.recv().await {
        if let Ok(ClientEvent::Logout) = state.codec.decode::<ClientEvent>(&data) {
            return;
        }
        tracing::debug!(conn_id = %conn.id(), "ignoring event sent during login");
    }
}

/// Receives client events until logout, close, or the idle timeout.
///
/// The idle clock runs from the last frame of any kind, so WebSocket
/// pings keep a quiet player connected.
async fn event_loop<P: IdentityProvider>(
    conn: &WebSocketConnection,
    state: &ServerState<P>,
    player_id: PlayerId,
    conn_id: ConnectionId,
) -> Result<(), QuestgateError> {
    loop {
        let remaining = state.idle_timeout.saturating_sub(conn.idle_for());
        if remaining.is_zero() {
            tracing::info!(%player_id, "connection timed out");
            return Ok(());
        }

        let data = match tokio::time::timeout(remaining, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%player_id, "connection closed cleanly");
                return Ok(());
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                return Err(e.into());
            }
            // Re-checked at the top: a ping may have arrived meanwhile.
            Err(_) => continue,
        };

        match state.codec.decode::<ClientEvent>(&data) {
            Ok(ClientEvent::Logout) => {
                tracing::info!(%player_id, "player logged out");
                return Ok(());
            }
            Ok(ClientEvent::Login(_)) => resend_welcome(state, player_id, conn_id).await,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode event");
            }
        }
    }
}

/// Answers a repeated `player:login` from an admitted player with a fresh
/// snapshot. The credentials are not checked again.
async fn resend_welcome<P: IdentityProvider>(
    state: &ServerState<P>,
    player_id: PlayerId,
    conn_id: ConnectionId,
) {
    match state.service.world().snapshot_for(player_id).await {
        Ok(Some(snapshot)) => {
            let hub = state.service.notifier();
            if let Err(e) = hub.emit(conn_id, &ServerEvent::Login(snapshot)).await {
                tracing::debug!(%player_id, error = %e, "failed to resend snapshot");
            }
        }
        Ok(None) => tracing::debug!(%player_id, "not in the world, no snapshot to resend"),
        Err(e) => tracing::debug!(%player_id, error = %e, "snapshot unavailable"),
    }
}

/// Ends the identity session. Failure only gets logged: the player is
/// already gone from the world.
async fn end_session<P: IdentityProvider>(state: &ServerState<P>, token: &AccessToken) {
    if let Err(e) = state.service.logout(token).await {
        tracing::warn!(kind = %e.kind(), error = %e, "identity logout failed");
    }
}

/// Queues an `error` event for the client.
async fn send_error(hub: &Hub, conn_id: ConnectionId, code: u16, message: &str) {
    let event = ServerEvent::Error {
        code,
        message: message.to_owned(),
    };
    if let Err(e) = hub.emit(conn_id, &event).await {
        tracing::debug!(%conn_id, error = %e, "failed to queue error event");
    }
}

/// HTTP-style code reported to the client for a failed login.
fn failure_code(kind: AuthFailureKind) -> u16 {
    match kind {
        AuthFailureKind::InvalidCredentials | AuthFailureKind::Unauthorized => 401,
        AuthFailureKind::NetworkError => 503,
        AuthFailureKind::MalformedResponse => 502,
    }
}

/// HTTP-style code reported to the client for a refused admission.
fn session_code(err: &SessionError) -> u16 {
    match err {
        SessionError::Auth(failure) => failure_code(failure.kind()),
        SessionError::World(WorldError::AlreadyJoined(_) | WorldError::ConnectionInUse(_)) => 409,
        SessionError::World(_) => 503,
    }
}

/// Client-facing text for a failed login. Never includes the failure's
/// own message.
fn failure_message(kind: AuthFailureKind) -> &'static str {
    match kind {
        AuthFailureKind::InvalidCredentials => "invalid login",
        AuthFailureKind::Unauthorized => "session rejected",
        AuthFailureKind::NetworkError => "identity service unavailable",
        AuthFailureKind::MalformedResponse => "identity service error",
    }
}

/// Client-facing text for a refused admission.
fn session_message(err: &SessionError) -> &'static str {
    match err {
        SessionError::Auth(failure) => failure_message(failure.kind()),
        SessionError::World(WorldError::AlreadyJoined(_)) => "already logged in",
        SessionError::World(WorldError::ConnectionInUse(_)) => "connection already has a player",
        SessionError::World(_) => "world unavailable",
    }
}
