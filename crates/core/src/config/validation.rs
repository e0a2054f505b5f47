//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not an http(s) URL with a host
    /// - `cache_name` or `user_agent` is empty
    /// - an asset path is not root-relative, or `offline_url` is not listed
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    ///
    /// Returns `ConfigError::Missing` if `assets` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin = self.origin_url()?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "origin".into(),
                reason: format!("unsupported scheme: {}", origin.scheme()),
            });
        }
        if origin.host_str().is_none() {
            return Err(ConfigError::Invalid { field: "origin".into(), reason: "must include a host".into() });
        }

        if self.cache_name.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "cache_name".into(), reason: "must not be empty".into() });
        }

        if self.assets.is_empty() {
            return Err(ConfigError::Missing {
                field: "assets".into(),
                hint: "List at least the offline page in the assets array".into(),
            });
        }
        if let Some(bad) = self.assets.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::Invalid {
                field: "assets".into(),
                reason: format!("path must be root-relative: {bad}"),
            });
        }
        if !self.assets.contains(&self.offline_url) {
            return Err(ConfigError::Invalid {
                field: "offline_url".into(),
                reason: format!("{} must be listed in assets", self.offline_url),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        let unique = self.manifest()?.len();
        if unique != self.assets.len() {
            tracing::warn!(
                listed = self.assets.len(),
                unique,
                "assets contains duplicate paths; duplicates are precached once"
            );
        }

        Ok(())
    }
}
