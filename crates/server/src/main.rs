//! mcp-precache server entry point.
//!
//! Boots the MCP server on stdio transport with one registration backed by
//! the configured SQLite cache. Logging goes to stderr to avoid interfering
//! with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use precache_client::{FetchClient, FetchConfig};
use precache_core::{AppConfig, CacheStorage};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod state;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let storage = CacheStorage::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache database {}", config.db_path.display()))?;
    let network = FetchClient::new(FetchConfig::from(&config))?;

    tracing::info!(
        origin = %config.origin,
        cache_name = %config.cache_name,
        db_path = %config.db_path.display(),
        "Starting mcp-precache server on stdio transport"
    );

    let state = state::AppState::new(config, storage, Arc::new(network));
    let handler = handler::McpPrecacheServer::new(state.clone());
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    state.registration.flush().await;

    Ok(())
}
