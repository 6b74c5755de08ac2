//! # Questgate
//!
//! Realtime game gateway that logs players in against a web identity
//! service.
//!
//! A game client opens a WebSocket, sends its credentials as
//! `player:login`, and Questgate exchanges them for a token and profile at
//! the identity service, admits the player to the shared world, welcomes
//! them with a world snapshot and tells everyone else who's online.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use questgate::prelude::*;
//!
//! # async fn start() -> Result<(), QuestgateError> {
//! let config = ServerConfig::from_env()?;
//! let identity = HttpIdentityProvider::new(config.identity.clone())?;
//! let server = QuestgateServerBuilder::from_config(&config)?
//!     .build(identity)
//!     .await?;
//! server.run().await
//! # }
//! ```

#![allow(async_fn_in_trait)]

mod config;
mod error;
mod handler;
mod hub;
mod server;

pub use config::{BIND_ADDR_VAR, DEFAULT_BIND_ADDR, ServerConfig, WORLD_FILE_VAR};
pub use error::QuestgateError;
pub use hub::Hub;
pub use server::{
    DEFAULT_IDLE_TIMEOUT, DEFAULT_LOGIN_TIMEOUT, QuestgateServer, QuestgateServerBuilder,
};

/// Re-exports of the types most applications need.
pub mod prelude {
    pub use crate::{QuestgateError, QuestgateServer, QuestgateServerBuilder, ServerConfig};
    pub use questgate_identity::{
        AuthFailure, AuthFailureKind, HttpIdentityProvider, IdentityConfig, IdentityProvider,
    };
    pub use questgate_protocol::{
        AccessToken, ClientEvent, Credentials, Player, PlayerId, Profile, ServerEvent,
        WorldSnapshot,
    };
    pub use questgate_session::{AuthenticationService, LoginOutcome, Notifier, SessionError};
    pub use questgate_world::{WorldAssets, WorldHandle};
}
