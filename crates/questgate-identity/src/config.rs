//! Identity service configuration.
//!
//! The base URL and timeout are read once (normally from the environment)
//! and handed to [`HttpIdentityProvider`](crate::HttpIdentityProvider) at
//! construction. Nothing reads the environment after startup.

use std::time::Duration;

use crate::ConfigError;

/// Environment variable holding the identity service base URL.
pub const SITE_URL_VAR: &str = "SITE_URL";

/// Environment variable holding the per-request timeout in milliseconds.
pub const TIMEOUT_VAR: &str = "IDENTITY_TIMEOUT_MS";

/// Where the identity service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Base URL without a trailing slash, e.g. `https://example.com`.
    base_url: String,

    /// Upper bound for one request, connect through body.
    pub timeout: Duration,
}

impl IdentityConfig {
    /// Per-request timeout used when none is configured.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a config for the given base URL with the default timeout.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] unless `base_url` is an absolute
    /// `http` or `https` URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let parsed = reqwest::Url::parse(&base_url).map_err(|e| ConfigError::Invalid {
            name: SITE_URL_VAR,
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                name: SITE_URL_VAR,
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Loads the config from process environment variables.
    ///
    /// - `SITE_URL` (required) — identity service base URL
    /// - `IDENTITY_TIMEOUT_MS` (optional, default 10000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading values through
    /// `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(SITE_URL_VAR).ok_or(ConfigError::Missing(SITE_URL_VAR))?;
        let config = Self::new(base_url)?;

        match lookup(TIMEOUT_VAR) {
            Some(raw) => {
                let millis: u64 = raw.parse().map_err(|e| ConfigError::Invalid {
                    name: TIMEOUT_VAR,
                    reason: format!("{e}"),
                })?;
                if millis == 0 {
                    return Err(ConfigError::Invalid {
                        name: TIMEOUT_VAR,
                        reason: "must be greater than zero".into(),
                    });
                }
                Ok(config.with_timeout(Duration::from_millis(millis)))
            }
            None => Ok(config),
        }
    }

    /// The base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the full URL of an endpoint path such as `/api/auth/me`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
