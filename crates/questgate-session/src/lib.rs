//! Player login and world admission for Questgate.
//!
//! This crate sequences everything that happens between "a client sent
//! credentials" and "everyone knows the player is online":
//!
//! 1. **Login** — token, then profile ([`AuthenticationService::login`])
//! 2. **Admission** — insert into the world, welcome the player, announce
//!    them ([`AuthenticationService::add_player`])
//! 3. **Departure** — remove from the world and announce it
//!    ([`AuthenticationService::remove_player`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)  ← one task per connection, calls into this crate
//!     ↕
//! Session Layer (this crate)  ← ordering of identity calls and announcements
//!     ↕
//! Identity / World / Notifier (below)
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod notify;
mod service;
mod session;

pub use error::SessionError;
pub use notify::Notifier;
pub use service::AuthenticationService;
pub use session::LoginOutcome;
