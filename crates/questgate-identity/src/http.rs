//! [`IdentityProvider`] over HTTP via `reqwest`.
//!
//! All three endpoints are `POST` with JSON bodies:
//!
//! | Call            | Path               | Auth           | Success body             |
//! |-----------------|--------------------|----------------|--------------------------|
//! | `request_token` | `/api/auth/login`  | credentials    | `{"access_token": "..."}`|
//! | `fetch_profile` | `/api/auth/me`     | bearer token   | the profile object       |
//! | `end_session`   | `/api/auth/logout` | bearer token   | any acknowledgment       |

use questgate_protocol::{AccessToken, Credentials, Profile};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::{AuthFailure, AuthFailureKind, ConfigError, IdentityConfig, IdentityProvider};

const LOGIN_PATH: &str = "/api/auth/login";
const PROFILE_PATH: &str = "/api/auth/me";
const LOGOUT_PATH: &str = "/api/auth/logout";

/// Login response envelope. Only the token is read.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// The identity service reached over HTTP.
///
/// Cheap to clone: `reqwest::Client` is a handle to a shared pool.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    config: IdentityConfig,
}

impl HttpIdentityProvider {
    /// Builds a client that applies `config.timeout` to every request.
    ///
    /// # Errors
    /// Returns [`ConfigError::HttpClient`] if the HTTP client can't be built.
    pub fn new(config: IdentityConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        tracing::debug!(
            base_url = config.base_url(),
            timeout = ?config.timeout,
            "identity client initialized"
        );
        Ok(Self { client, config })
    }

    /// The configuration this provider was built with.
    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }
}

impl IdentityProvider for HttpIdentityProvider {
    async fn request_token(&self, credentials: &Credentials) -> Result<AccessToken, AuthFailure> {
        let url = self.config.endpoint(LOGIN_PATH);
        tracing::debug!(%url, "requesting access token");

        let response = self
            .client
            .post(&url)
            .json(credentials)
            .send()
            .await
            .map_err(request_failure)?;

        let body = success_body(response, AuthFailureKind::InvalidCredentials).await?;
        extract_token(&body)
    }

    async fn fetch_profile(&self, token: &AccessToken) -> Result<Profile, AuthFailure> {
        let url = self.config.endpoint(PROFILE_PATH);
        tracing::debug!(%url, "fetching profile");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(request_failure)?;

        let body = success_body(response, AuthFailureKind::Unauthorized).await?;
        serde_json::from_slice(&body)
            .map_err(|e| AuthFailure::malformed(format!("unusable profile body: {e}")))
    }

    async fn end_session(&self, token: &AccessToken) -> Result<serde_json::Value, AuthFailure> {
        let url = self.config.endpoint(LOGOUT_PATH);
        tracing::debug!(%url, "ending session");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(request_failure)?;

        let body = success_body(response, AuthFailureKind::Unauthorized).await?;
        Ok(parse_ack(&body))
    }
}

/// Maps a `reqwest` send/read error. Everything here is a transport
/// problem, timeouts included.
fn request_failure(err: reqwest::Error) -> AuthFailure {
    if err.is_timeout() {
        AuthFailure::network("identity service timed out")
    } else {
        AuthFailure::network(format!("identity service unreachable: {err}"))
    }
}

/// Classifies a non-success status.
///
/// `rejected` is what a 4xx means for this endpoint: bad credentials for
/// login, a bad token for everything else.
fn classify_status(status: StatusCode, rejected: AuthFailureKind) -> AuthFailure {
    let message = format!("identity service returned {status}");
    if status.is_client_error() {
        AuthFailure::new(rejected, message)
    } else if status.is_server_error() {
        AuthFailure::network(message)
    } else {
        AuthFailure::malformed(message)
    }
}

/// Returns the body of a 2xx response, or the classified failure.
async fn success_body(
    response: reqwest::Response,
    rejected: AuthFailureKind,
) -> Result<Vec<u8>, AuthFailure> {
    let status = response.status();
    if !status.is_success() {
        return Err(classify_status(status, rejected));
    }
    let body = response.bytes().await.map_err(request_failure)?;
    Ok(body.to_vec())
}

fn extract_token(body: &[u8]) -> Result<AccessToken, AuthFailure> {
    let parsed: TokenResponse = serde_json::from_slice(body)
        .map_err(|e| AuthFailure::malformed(format!("unusable login body: {e}")))?;

    match parsed.access_token {
        Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
        _ => Err(AuthFailure::malformed("login response has no access_token")),
    }
}

/// Logout acknowledgments are passed through as-is: JSON when the body is
/// JSON, a JSON string otherwise, `null` when empty.
fn parse_ack(body: &[u8]) -> serde_json::Value {
    if body.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()))
}
