//! Local Gigs Profile Server binary.

use std::net::SocketAddr;

use profile_server::{
    config::{Config, StorageBackend},
    init_tracing, serve,
};
use profile_store::{MemoryProfileStore, SqliteProfileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level);

    let addr: SocketAddr = config.server_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    match config.storage_backend() {
        StorageBackend::Memory => {
            tracing::warn!("No database configured, profiles are kept in memory");
            serve(listener, config, MemoryProfileStore::new()).await?;
        }
        StorageBackend::Sqlite(url) => {
            let store = SqliteProfileStore::connect(&url).await?;
            serve(listener, config, store).await?;
        }
    }

    Ok(())
}
