//! Error types for the identity layer.
//!
//! [`AuthFailure`] is the single failure every identity call can end in.
//! Its [`AuthFailureKind`] is what callers branch on: "invalid login" and
//! "server unreachable" need different messages for the player.

use std::fmt;

/// What went wrong talking to the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthFailureKind {
    /// The service rejected the credentials (4xx on login).
    InvalidCredentials,

    /// The service rejected the bearer token (4xx on profile or logout).
    /// Covers both invalid and expired tokens.
    Unauthorized,

    /// The service could not be reached, timed out, or answered 5xx.
    NetworkError,

    /// The service answered success but the body was unusable
    /// (not JSON, missing `access_token`, profile without `id`, ...).
    MalformedResponse,
}

impl AuthFailureKind {
    /// The kebab-case name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid-credentials",
            Self::Unauthorized => "unauthorized",
            Self::NetworkError => "network-error",
            Self::MalformedResponse => "malformed-response",
        }
    }
}

impl fmt::Display for AuthFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed identity call. Terminal: nothing in Questgate retries it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct AuthFailure {
    kind: AuthFailureKind,
    message: String,
}

impl AuthFailure {
    /// Creates a failure of the given kind.
    pub fn new(kind: AuthFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for [`AuthFailureKind::InvalidCredentials`].
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(AuthFailureKind::InvalidCredentials, message)
    }

    /// Shorthand for [`AuthFailureKind::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(AuthFailureKind::Unauthorized, message)
    }

    /// Shorthand for [`AuthFailureKind::NetworkError`].
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(AuthFailureKind::NetworkError, message)
    }

    /// Shorthand for [`AuthFailureKind::MalformedResponse`].
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(AuthFailureKind::MalformedResponse, message)
    }

    /// The failure category.
    pub fn kind(&self) -> AuthFailureKind {
        self.kind
    }

    /// Human-readable detail (status code, parse error, ...).
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised while building the identity client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required env var {0}")]
    Missing(&'static str),

    /// A value is set but can't be used.
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    /// The HTTP client could not be constructed (e.g. TLS backend failure).
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_display_includes_kind_and_message() {
        let err = AuthFailure::invalid_credentials("identity service returned 401");
        assert_eq!(
            err.to_string(),
            "invalid-credentials: identity service returned 401"
        );
    }

    #[test]
    fn test_auth_failure_constructors_set_kind() {
        assert_eq!(AuthFailure::unauthorized("x").kind(), AuthFailureKind::Unauthorized);
        assert_eq!(AuthFailure::network("x").kind(), AuthFailureKind::NetworkError);
        assert_eq!(
            AuthFailure::malformed("x").kind(),
            AuthFailureKind::MalformedResponse
        );
    }

    #[test]
    fn test_config_error_missing_names_the_variable() {
        let err = ConfigError::Missing("SITE_URL");
        assert_eq!(err.to_string(), "missing required env var SITE_URL");
    }
}
