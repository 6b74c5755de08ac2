//! Server configuration, loaded once at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use questgate_identity::{ConfigError, IdentityConfig};

/// Environment variable holding the listen address (`ip:port`).
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";

/// Environment variable holding the path of the world assets JSON file.
pub const WORLD_FILE_VAR: &str = "WORLD_FILE";

/// Listen address used when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Everything the `questgate-server` binary needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Identity service location and timeout.
    pub identity: IdentityConfig,

    /// Optional world assets file. An empty world is used without one.
    pub world_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Loads the config from process environment variables.
    ///
    /// - `BIND_ADDR` (optional, default `127.0.0.1:8080`)
    /// - `WORLD_FILE` (optional)
    /// - `SITE_URL`, `IDENTITY_TIMEOUT_MS` (see [`IdentityConfig::from_env`])
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading values through
    /// `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: BIND_ADDR_VAR,
                reason: e.to_string(),
            })?;

        let world_file = lookup(WORLD_FILE_VAR)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind_addr,
            identity: IdentityConfig::from_lookup(&lookup)?,
            world_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config =
            ServerConfig::from_lookup(lookup_from(&[("SITE_URL", "http://localhost:8000")]))
                .unwrap();

        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.identity.base_url(), "http://localhost:8000");
        assert!(config.world_file.is_none());
    }

    #[test]
    fn test_from_lookup_all_values() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("SITE_URL", "https://id.example.com/"),
            ("IDENTITY_TIMEOUT_MS", "2500"),
            ("BIND_ADDR", "0.0.0.0:9000"),
            ("WORLD_FILE", "assets/world.json"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.identity.timeout.as_millis(), 2500);
        assert_eq!(config.world_file, Some(PathBuf::from("assets/world.json")));
    }

    #[test]
    fn test_from_lookup_missing_site_url_fails() {
        let err = ServerConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SITE_URL")));
    }

    #[test]
    fn test_from_lookup_bad_bind_addr_fails() {
        let err = ServerConfig::from_lookup(lookup_from(&[
            ("SITE_URL", "http://localhost:8000"),
            ("BIND_ADDR", "not-an-address"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BIND_ADDR", .. }));
    }
}
