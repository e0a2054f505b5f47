//! sw_install tool implementation.
//!
//! Installs a cache version and hands control to it when allowed.

use precache_worker::{RegistrationStatus, WorkerState};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ServerError;
use crate::state::AppState;

/// Parameters for the sw_install tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwInstallParams {
    /// Version (store name) to install. Defaults to the configured cache name;
    /// a different name simulates deploying a new version.
    #[serde(default)]
    pub cache_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwInstallOutput {
    pub version: String,
    pub state: WorkerState,
    pub registration: RegistrationStatus,
}

pub async fn install_impl(state: &AppState, params: SwInstallParams) -> Result<CallToolResult, McpError> {
    if let Some(name) = &params.cache_name
        && name.trim().is_empty()
    {
        return Err(ServerError::InvalidInput("cache_name cannot be empty".into()).into());
    }

    let manager = state.manager(params.cache_name.as_deref())?;
    let version = manager.version().to_string();
    tracing::info!(%version, "install requested");

    let worker_state = state.registration.update(manager).await?;

    let output =
        SwInstallOutput { version, state: worker_state, registration: state.registration.status().await };
    Ok(json_result(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{ASSETS, output, site};

    #[tokio::test]
    async fn test_install_activates_configured_version() {
        let (_server, state) = site().await;

        let result = install_impl(&state, SwInstallParams::default()).await.unwrap();
        let out = output(&result);
        assert_eq!(out["version"], "v1");
        assert_eq!(out["state"], "active");
        assert_eq!(out["registration"]["active"]["version"], "v1");

        let cache = state.storage.open_store("v1").await.unwrap();
        assert_eq!(cache.len().await.unwrap(), ASSETS.len());
    }

    #[tokio::test]
    async fn test_install_new_version_purges_old_store() {
        let (_server, state) = site().await;
        install_impl(&state, SwInstallParams::default()).await.unwrap();

        let params = SwInstallParams { cache_name: Some("v2".into()) };
        let out = output(&install_impl(&state, params).await.unwrap());
        assert_eq!(out["state"], "active");
        assert_eq!(state.storage.keys().await.unwrap(), vec!["v2".to_string()]);
    }

    #[tokio::test]
    async fn test_install_fails_when_asset_missing() {
        let (server, state) = site().await;
        server.reset().await;

        let err = install_impl(&state, SwInstallParams::default()).await.unwrap_err();
        assert_eq!(err.code.0, -32014);
        assert!(state.registration.status().await.active.is_none());
    }

    #[tokio::test]
    async fn test_install_rejects_blank_name() {
        let (_server, state) = site().await;
        let params = SwInstallParams { cache_name: Some("  ".into()) };
        let err = install_impl(&state, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
