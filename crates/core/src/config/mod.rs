//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PRECACHE_*)
//! 2. TOML config file (if PRECACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::AssetManifest;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PRECACHE_*)
/// 2. TOML config file (if PRECACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin of the site whose requests are intercepted.
    ///
    /// Set via PRECACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Name of the current cache store. Change it to invalidate every
    /// previously stored snapshot.
    ///
    /// Set via PRECACHE_CACHE_NAME environment variable.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Root-relative path of the offline fallback page.
    ///
    /// Set via PRECACHE_OFFLINE_URL environment variable.
    #[serde(default = "default_offline_url")]
    pub offline_url: String,

    /// Root-relative asset paths precached on install.
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,

    /// Path to SQLite cache database.
    ///
    /// Set via PRECACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via PRECACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via PRECACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via PRECACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects followed per request.
    ///
    /// Set via PRECACHE_MAX_REDIRECTS environment variable.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Whether a freshly installed version skips waiting for the previous
    /// version's clients to close.
    ///
    /// Set via PRECACHE_SKIP_WAITING_ON_INSTALL environment variable.
    #[serde(default = "default_true")]
    pub skip_waiting_on_install: bool,
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_cache_name() -> String {
    "elite-security-v1".into()
}

fn default_offline_url() -> String {
    "/offline.html".into()
}

fn default_assets() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/offline.html",
        "/css/language-switcher.css",
        "/css/header.css",
        "/js/main.js",
        "/js/language-switcher.js",
        "/js/mobile-menu.js",
        "/favicon.ico",
        "/favicon.svg",
        "/apple-touch-icon.png",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./precache.sqlite")
}

fn default_user_agent() -> String {
    "precache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    5
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_name: default_cache_name(),
            offline_url: default_offline_url(),
            assets: default_assets(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            skip_waiting_on_install: true,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed site origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// Asset manifest built from `assets` and `offline_url`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the manifest is rejected.
    pub fn manifest(&self) -> Result<AssetManifest, ConfigError> {
        AssetManifest::new(self.assets.iter().cloned(), self.offline_url.clone())
            .map_err(|e| ConfigError::Invalid { field: "assets".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PRECACHE_`
    /// 2. TOML file from `PRECACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PRECACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PRECACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.origin, "http://localhost:3000");
        assert_eq!(config.cache_name, "elite-security-v1");
        assert_eq!(config.offline_url, "/offline.html");
        assert_eq!(config.assets.len(), 11);
        assert_eq!(config.db_path, PathBuf::from("./precache.sqlite"));
        assert_eq!(config.user_agent, "precache/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_redirects, 5);
        assert!(config.skip_waiting_on_install);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_default_manifest_contains_offline_page() {
        let manifest = AppConfig::default().manifest().unwrap();
        assert_eq!(manifest.offline_path(), "/offline.html");
        assert!(manifest.paths().iter().any(|p| p == "/offline.html"));
    }

    #[test]
    fn test_load_from_env_and_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "precache.toml",
                r#"
                cache_name = "from-file"
                origin = "https://example.com"
                "#,
            )?;
            jail.set_env("PRECACHE_CONFIG_FILE", "precache.toml");
            jail.set_env("PRECACHE_CACHE_NAME", "from-env-v2");
            jail.set_env("PRECACHE_SKIP_WAITING_ON_INSTALL", "false");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.cache_name, "from-env-v2");
            assert_eq!(config.origin, "https://example.com");
            assert!(!config.skip_waiting_on_install);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PRECACHE_OFFLINE_URL", "/missing.html");
            let result = AppConfig::load();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "offline_url"));
            Ok(())
        });
    }
}
