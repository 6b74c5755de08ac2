//! The identity-service capability the login flow consumes.
//!
//! Questgate doesn't own player accounts; a remote identity service does.
//! [`IdentityProvider`] describes the three calls the gateway needs from
//! it. [`HttpIdentityProvider`](crate::HttpIdentityProvider) is the real
//! implementation; tests plug in their own to count calls or script
//! failures without a network.

use questgate_protocol::{AccessToken, Credentials, Profile};

use crate::AuthFailure;

/// One remote identity service.
///
/// Each method is a single attempt: no retries, no caching. A failure is
/// returned to the caller as-is.
///
/// # Trait bounds
///
/// - `Send + Sync` → one provider is shared by every connection task.
/// - `'static` → it lives as long as the server.
/// - The returned futures are `Send` so a login can run inside
///   `tokio::spawn`.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Exchanges credentials for a bearer token.
    fn request_token(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<AccessToken, AuthFailure>> + Send;

    /// Fetches the profile of the player the token belongs to.
    fn fetch_profile(
        &self,
        token: &AccessToken,
    ) -> impl std::future::Future<Output = Result<Profile, AuthFailure>> + Send;

    /// Ends the session server-side and returns the service's
    /// acknowledgment body.
    fn end_session(
        &self,
        token: &AccessToken,
    ) -> impl std::future::Future<Output = Result<serde_json::Value, AuthFailure>> + Send;
}
