//! cache_get tool implementation.
//!
//! Retrieves one stored snapshot by store name and request URL.

use precache_core::{Error, Request, Snapshot};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::{ResponseView, json_result};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Store holding the snapshot.
    pub store: String,

    /// Request URL, absolute or root-relative.
    pub url: String,

    /// Request method (default: GET).
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheGetOutput {
    pub store: String,
    pub request_key: String,
    pub method: String,
    pub url: String,
    pub stored_at: String,
    pub response: ResponseView,
}

impl From<Snapshot> for CacheGetOutput {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            response: ResponseView::from(&snapshot.response),
            store: snapshot.store,
            request_key: snapshot.request_key,
            method: snapshot.method,
            url: snapshot.url,
            stored_at: snapshot.stored_at,
        }
    }
}

pub async fn get_impl(state: &AppState, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let request = Request::new(params.method.as_deref().unwrap_or("GET"), state.resolve(&params.url)?);

    if !state.storage.has(&params.store).await? {
        return Err(Error::StoreNotFound(params.store).into());
    }

    let snapshot = state
        .storage
        .store(&params.store)
        .match_request(&request)
        .await?
        .ok_or_else(|| Error::CacheMiss(request.cache_url()))?;

    Ok(json_result(&CacheGetOutput::from(snapshot))?)
}
