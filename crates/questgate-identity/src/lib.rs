//! Identity service client for Questgate.
//!
//! Questgate authenticates players against an external identity service
//! (a web backend exposing `/api/auth/login`, `/api/auth/me` and
//! `/api/auth/logout`). This crate holds:
//!
//! 1. **The capability** — [`IdentityProvider`], the three remote calls
//! 2. **The HTTP implementation** — [`HttpIdentityProvider`] (`reqwest`)
//! 3. **Configuration** — [`IdentityConfig`], injected at construction
//! 4. **Failures** — [`AuthFailure`] and its [`AuthFailureKind`]
//!
//! ```text
//! Session Layer (above)  ← composes token → profile into a login
//!     ↕
//! Identity Layer (this crate)  ← one HTTP call per method, no retries
//!     ↕
//! Identity service (remote)
//! ```

mod config;
mod error;
mod http;
mod provider;

pub use config::{IdentityConfig, SITE_URL_VAR, TIMEOUT_VAR};
pub use error::{AuthFailure, AuthFailureKind, ConfigError};
pub use http::HttpIdentityProvider;
pub use provider::IdentityProvider;
