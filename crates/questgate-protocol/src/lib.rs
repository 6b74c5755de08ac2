//! Wire protocol for Questgate.
//!
//! This crate defines the "language" spoken on both sides of the gateway:
//!
//! - **Types** ([`Credentials`], [`AccessToken`], [`Profile`], [`Player`],
//!   [`WorldSnapshot`]) — identity data and world payloads.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) — the named JSON frames
//!   exchanged with game clients.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how events become bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while decoding.
//!
//! ```text
//! Transport (bytes) → Protocol (events) → Session (login / join)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    AccessToken, ClientEvent, Credentials, ERROR_EVENT, JOINED_EVENT, LEFT_EVENT, LOGIN_EVENT,
    LOGOUT_EVENT, Player, PlayerId, Profile, ServerEvent, WorldSnapshot,
};
