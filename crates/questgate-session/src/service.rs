//! The authentication service: login, logout, and joining the world.
//!
//! This is the central piece of the session layer. It composes the
//! identity calls into a login, and sequences a world join so that the
//! joining player hears about the world before everyone else hears about
//! the player.
//!
//! # Flow
//!
//! ```text
//! login(credentials)
//!   ├─ get_token()   ── fails? stop, nothing else happens
//!   └─ get_profile() ── fails? stop, the token is discarded
//!         │
//! add_player(player)
//!   ├─ world insert + snapshot   (one step inside the world actor)
//!   ├─ emit player:login         (only the joining connection)
//!   └─ broadcast player:joined   (everyone, full roster)
//! ```
//!
//! # Concurrency note
//!
//! The world actor already serializes roster mutations. The `announce`
//! lock additionally keeps the emit/broadcast pairs of concurrent joins
//! from interleaving, so clients observe `player:joined` rosters in the
//! same order the world accepted them.

use questgate_identity::{AuthFailure, IdentityProvider};
use questgate_protocol::{AccessToken, Credentials, Player, PlayerId, Profile, ServerEvent};
use questgate_world::{JoinOutcome, LeaveOutcome, WorldHandle};
use tokio::sync::Mutex;

use crate::{LoginOutcome, Notifier, SessionError};

/// Logs players in against the identity service and admits them to the
/// world.
///
/// Generic over the identity backend and the notification channel so
/// the whole flow can be exercised without a network.
pub struct AuthenticationService<P, N> {
    identity: P,
    notifier: N,
    world: WorldHandle,
    announce: Mutex<()>,
}

impl<P: IdentityProvider, N: Notifier> AuthenticationService<P, N> {
    /// Wires the service to its collaborators.
    pub fn new(identity: P, notifier: N, world: WorldHandle) -> Self {
        Self {
            identity,
            notifier,
            world,
            announce: Mutex::new(()),
        }
    }

    /// Authenticates `credentials` and returns the player's profile
    /// together with the session token.
    ///
    /// Performs exactly one token request and, only if that succeeds,
    /// exactly one profile request. Never touches the world or the
    /// transport.
    ///
    /// # Errors
    /// The first [`AuthFailure`] encountered, unchanged.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, AuthFailure> {
        let token = self.get_token(credentials).await?;
        let player = self.get_profile(&token).await?;

        tracing::info!(player_id = %player.id, "login succeeded");
        Ok(LoginOutcome { player, token })
    }

    /// Exchanges credentials for a bearer token.
    pub async fn get_token(&self, credentials: &Credentials) -> Result<AccessToken, AuthFailure> {
        self.identity
            .request_token(credentials)
            .await
            .inspect_err(|e| tracing::debug!(kind = %e.kind(), "token request failed"))
    }

    /// Fetches the profile a token belongs to.
    pub async fn get_profile(&self, token: &AccessToken) -> Result<Profile, AuthFailure> {
        self.identity
            .fetch_profile(token)
            .await
            .inspect_err(|e| tracing::debug!(kind = %e.kind(), "profile request failed"))
    }

    /// Ends the session on the identity service.
    ///
    /// Returns the service's acknowledgment. Does not remove the player
    /// from the world; see [`remove_player`](Self::remove_player).
    pub async fn logout(&self, token: &AccessToken) -> Result<serde_json::Value, AuthFailure> {
        let ack = self
            .identity
            .end_session(token)
            .await
            .inspect_err(|e| tracing::debug!(kind = %e.kind(), "logout failed"))?;

        tracing::debug!("session ended");
        Ok(ack)
    }

    /// Admits an authenticated player to the world and announces it.
    ///
    /// The joining connection receives `player:login` with a snapshot
    /// that already contains the player, and only after that does every
    /// connection receive `player:joined` with the full roster.
    ///
    /// Delivery failures are logged and swallowed: once the world has
    /// accepted the player, the join has happened.
    ///
    /// # Errors
    /// [`SessionError::World`] if the world refuses the player. Nothing
    /// is sent in that case.
    pub async fn add_player(&self, player: Player) -> Result<(), SessionError> {
        let _announce = self.announce.lock().await;

        let connection = player.connection;
        let player_id = player.id();
        let JoinOutcome { snapshot, roster } = self.world.add_player(player).await?;
        let online = roster.len();

        if let Err(e) = self.notifier.emit(connection, &ServerEvent::Login(snapshot)).await {
            tracing::warn!(%player_id, %connection, error = %e, "failed to deliver world snapshot");
        }
        if let Err(e) = self.notifier.broadcast(&ServerEvent::Joined(roster)).await {
            tracing::warn!(%player_id, error = %e, "failed to broadcast join");
        }

        tracing::info!(%player_id, %connection, online, "player joined");
        Ok(())
    }

    /// Removes a player from the world and broadcasts the remaining
    /// roster as `player:left`.
    ///
    /// # Errors
    /// [`SessionError::World`] if the player isn't in the world.
    pub async fn remove_player(&self, player_id: PlayerId) -> Result<Player, SessionError> {
        let _announce = self.announce.lock().await;

        let LeaveOutcome { player, roster } = self.world.remove_player(player_id).await?;
        let online = roster.len();

        if let Err(e) = self.notifier.broadcast(&ServerEvent::Left(roster)).await {
            tracing::warn!(%player_id, error = %e, "failed to broadcast leave");
        }

        tracing::info!(%player_id, online, "player left");
        Ok(player)
    }

    /// The world this service admits players to.
    pub fn world(&self) -> &WorldHandle {
        &self.world
    }

    /// The notifier events are delivered through.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

// =========================================================================
// Tests
// =========================================================================
