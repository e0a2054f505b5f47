//! Explicit context owned by each manager instance.

use std::sync::Arc;
use url::Url;

use precache_core::{AppConfig, AssetManifest, CacheStorage, ConfigError, Network};

use crate::ClientRegistry;

/// Everything one cache version needs: the storage handle, its store name,
/// the site origin and manifest, the network, and the shared client registry.
#[derive(Clone)]
pub struct WorkerContext {
    pub storage: CacheStorage,
    pub cache_name: String,
    pub origin: Url,
    pub manifest: AssetManifest,
    pub network: Arc<dyn Network>,
    pub clients: ClientRegistry,
    pub skip_waiting_on_install: bool,
}

impl WorkerContext {
    pub fn new(
        storage: CacheStorage, cache_name: impl Into<String>, origin: Url, manifest: AssetManifest,
        network: Arc<dyn Network>,
    ) -> Self {
        Self {
            storage,
            cache_name: cache_name.into(),
            origin,
            manifest,
            network,
            clients: ClientRegistry::new(),
            skip_waiting_on_install: true,
        }
    }

    /// Build a context from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin or manifest is rejected.
    pub fn from_config(
        config: &AppConfig, storage: CacheStorage, network: Arc<dyn Network>, clients: ClientRegistry,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(storage, config.cache_name.clone(), config.origin_url()?, config.manifest()?, network)
            .with_clients(clients)
            .with_skip_waiting_on_install(config.skip_waiting_on_install))
    }

    pub fn with_clients(mut self, clients: ClientRegistry) -> Self {
        self.clients = clients;
        self
    }

    pub fn with_skip_waiting_on_install(mut self, skip: bool) -> Self {
        self.skip_waiting_on_install = skip;
        self
    }

    pub fn with_cache_name(mut self, cache_name: impl Into<String>) -> Self {
        self.cache_name = cache_name.into();
        self
    }
}
