//! cache_keys tool implementation.
//!
//! Lists store names, or the requests stored in one store.

use precache_core::Error;
use precache_core::cache::CachedRequest;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// Store to list. Omit to list store names instead.
    #[serde(default)]
    pub store: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CacheKeysOutput {
    Stores { stores: Vec<String> },
    Requests { store: String, requests: Vec<CachedRequest> },
}

pub async fn keys_impl(state: &AppState, params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    let output = match params.store {
        None => CacheKeysOutput::Stores { stores: state.storage.keys().await? },
        Some(store) => {
            if !state.storage.has(&store).await? {
                return Err(Error::StoreNotFound(store).into());
            }
            let requests = state.storage.store(&store).keys().await?;
            CacheKeysOutput::Requests { store, requests }
        }
    };

    Ok(json_result(&output)?)
}
