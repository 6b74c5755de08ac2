//! Session types: what a successful login hands back to the caller.

use questgate_protocol::{AccessToken, Profile};

/// The result of a successful [`login`](crate::AuthenticationService::login).
///
/// Both halves always come together: a login either yields a token AND
/// the profile it belongs to, or fails as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    /// The authenticated player's profile.
    pub player: Profile,

    /// The bearer token for this session. Needed again for logout.
    pub token: AccessToken,
}
