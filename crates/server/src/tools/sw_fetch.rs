//! sw_fetch tool implementation.
//!
//! Offers a request to the registration as an intercepted fetch. Requests the
//! active version declines go straight to the network.

use precache_core::{Network, Request};
use precache_worker::{DeclineReason, FetchOutcome, ResponseSource};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ResponseView, json_result};
use crate::state::AppState;

/// Parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a root-relative path on the configured origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default)]
    pub method: Option<String>,

    /// Accept header. Navigations send `text/html`.
    #[serde(default)]
    pub accept: Option<String>,

    /// Client (page) issuing the request. A new id is a navigation.
    #[serde(default)]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchSource {
    Network,
    Cache,
    OfflineFallback,
    /// Declined by the manager and fetched without it.
    Passthrough,
}

impl From<ResponseSource> for FetchSource {
    fn from(source: ResponseSource) -> Self {
        match source {
            ResponseSource::Network => Self::Network,
            ResponseSource::Cache => Self::Cache,
            ResponseSource::OfflineFallback => Self::OfflineFallback,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SwFetchOutput {
    pub source: FetchSource,
    pub declined: Option<DeclineReason>,
    pub response: ResponseView,
}

pub async fn fetch_impl(state: &AppState, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    let url = state.resolve(&params.url)?;
    let mut request = Request::new(params.method.as_deref().unwrap_or("GET"), url);
    if let Some(accept) = params.accept {
        request = request.with_header("Accept", accept);
    }

    let output = match state.registration.fetch(params.client_id.as_deref(), &request).await? {
        FetchOutcome::Served(served) => SwFetchOutput {
            source: served.source.into(),
            declined: None,
            response: ResponseView::from(&served.response),
        },
        FetchOutcome::Declined(reason) => {
            tracing::debug!(url = %request.url, ?reason, "declined; fetching directly");
            let response = state.network.fetch(&request).await?;
            SwFetchOutput {
                source: FetchSource::Passthrough,
                declined: Some(reason),
                response: ResponseView::from(&response),
            }
        }
    };

    Ok(json_result(&output)?)
}
