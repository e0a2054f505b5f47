//! Shared state behind every tool call.

use std::sync::Arc;

use precache_core::{AppConfig, CacheStorage, Network};
use precache_worker::{CacheManager, ClientRegistry, Registration, WorkerContext};
use url::Url;

use crate::error::ServerError;

pub struct AppState {
    pub config: AppConfig,
    pub storage: CacheStorage,
    pub network: Arc<dyn Network>,
    pub registration: Registration,
}

impl AppState {
    pub fn new(config: AppConfig, storage: CacheStorage, network: Arc<dyn Network>) -> Arc<Self> {
        Arc::new(Self { config, storage, network, registration: Registration::new(ClientRegistry::new()) })
    }

    pub fn origin(&self) -> Result<Url, ServerError> {
        Ok(self.config.origin_url()?)
    }

    /// Build a manager for `cache_name`, or the configured version.
    pub fn manager(&self, cache_name: Option<&str>) -> Result<Arc<CacheManager>, ServerError> {
        let mut ctx = WorkerContext::from_config(
            &self.config,
            self.storage.clone(),
            self.network.clone(),
            self.registration.clients().clone(),
        )?;
        if let Some(name) = cache_name {
            ctx = ctx.with_cache_name(name);
        }
        Ok(Arc::new(CacheManager::new(ctx)))
    }

    /// Parse tool input as a URL, resolving root-relative paths against the
    /// configured origin.
    pub fn resolve(&self, input: &str) -> Result<Url, ServerError> {
        precache_client::resolve(&self.origin()?, input).map_err(|e| ServerError::InvalidInput(format!("url: {e}")))
    }
}
