//! The `questgate-server` binary.
//!
//! Configuration comes from the environment (`SITE_URL`, `BIND_ADDR`,
//! `WORLD_FILE`, `IDENTITY_TIMEOUT_MS`); log filtering from `RUST_LOG`.

use questgate::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), QuestgateError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        identity = config.identity.base_url(),
        world_file = ?config.world_file,
        "starting"
    );

    let identity = HttpIdentityProvider::new(config.identity.clone())?;
    let server = QuestgateServerBuilder::from_config(&config)?.build(identity).await?;
    server.run().await
}
