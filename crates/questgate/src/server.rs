//! `QuestgateServer` builder and server loop.
//!
//! This is the entry point for running a Questgate gateway. It ties
//! together all the layers: transport → protocol → session → world.

use std::sync::Arc;
use std::time::Duration;

use questgate_identity::IdentityProvider;
use questgate_protocol::JsonCodec;
use questgate_session::AuthenticationService;
use questgate_transport::{Transport, WebSocketTransport};
use questgate_world::{WorldAssets, WorldHandle, spawn_world};

use crate::handler::handle_connection;
use crate::hub::Hub;
use crate::{QuestgateError, ServerConfig};

/// How long a new connection may stay silent before sending its login.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a logged-in connection may stay silent before it is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks.
pub(crate) struct ServerState<P: IdentityProvider> {
    pub(crate) service: AuthenticationService<P, Hub>,
    pub(crate) codec: JsonCodec,
    pub(crate) login_timeout: Duration,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Questgate server.
///
/// # Example
///
/// ```rust,ignore
/// use questgate::prelude::*;
///
/// let identity = HttpIdentityProvider::new(IdentityConfig::from_env()?)?;
/// let server = QuestgateServer::builder()
///     .bind("0.0.0.0:8080")
///     .assets(WorldAssets::load("world.json")?)
///     .build(identity)
///     .await?;
/// server.run().await
/// ```
pub struct QuestgateServerBuilder {
    bind_addr: String,
    assets: WorldAssets,
    login_timeout: Duration,
    idle_timeout: Duration,
}

impl QuestgateServerBuilder {
    /// Creates a new builder with default settings and an empty world.
    pub fn new() -> Self {
        Self {
            bind_addr: crate::config::DEFAULT_BIND_ADDR.to_string(),
            assets: WorldAssets::default(),
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Creates a builder from loaded configuration, reading the world
    /// assets file if one is configured.
    ///
    /// # Errors
    /// [`QuestgateError::World`] if the assets file can't be loaded.
    pub fn from_config(config: &ServerConfig) -> Result<Self, QuestgateError> {
        let builder = Self::new().bind(&config.bind_addr);
        match &config.world_file {
            Some(path) => Ok(builder.assets(WorldAssets::load(path)?)),
            None => Ok(builder),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the map, NPCs and items new players are shown.
    pub fn assets(mut self, assets: WorldAssets) -> Self {
        self.assets = assets;
        self
    }

    /// Sets how long a connection may take to send its login.
    pub fn login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Sets how long a logged-in connection may stay silent.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Binds the listener, starts the world, and wires the
    /// authentication service to the given identity provider.
    pub async fn build<P: IdentityProvider>(
        self,
        identity: P,
    ) -> Result<QuestgateServer<P>, QuestgateError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let service = AuthenticationService::new(identity, Hub::new(), spawn_world(self.assets));
        let state = Arc::new(ServerState {
            service,
            codec: JsonCodec,
            login_timeout: self.login_timeout,
            idle_timeout: self.idle_timeout,
        });

        Ok(QuestgateServer { transport, state })
    }
}

impl Default for QuestgateServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Questgate server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct QuestgateServer<P: IdentityProvider> {
    transport: WebSocketTransport,
    state: Arc<ServerState<P>>,
}

impl<P: IdentityProvider> QuestgateServer<P> {
    /// Creates a new builder.
    pub fn builder() -> QuestgateServerBuilder {
        QuestgateServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The world players are admitted to.
    pub fn world(&self) -> WorldHandle {
        self.state.service.world().clone()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), QuestgateError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Questgate server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
