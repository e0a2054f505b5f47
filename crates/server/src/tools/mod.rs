//! MCP tool implementations.
//!
//! This module contains all tools exposed by the mcp-precache server.

use precache_core::Response;
use rmcp::model::{CallToolResult, Content};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

pub mod cache;
pub mod client_close;
pub mod sw_fetch;
pub mod sw_install;
pub mod sw_message;
pub mod sw_status;

pub use client_close::{ClientCloseParams, close_impl};
pub use sw_fetch::{SwFetchParams, fetch_impl};
pub use sw_install::{SwInstallParams, install_impl};
pub use sw_message::{SwMessageParams, message_impl};
pub use sw_status::status_impl;

/// A response rendered for tool output. Bodies are decoded as lossy UTF-8.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseView {
    pub url: String,
    pub status: u16,
    pub response_type: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl From<&Response> for ResponseView {
    fn from(response: &Response) -> Self {
        Self {
            url: response.url.clone(),
            status: response.status,
            response_type: response.response_type.as_str().to_string(),
            headers: response.headers.clone(),
            body: String::from_utf8_lossy(&response.body).into_owned(),
        }
    }
}

/// Wrap `output` as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, ServerError> {
    let json = serde_json::to_string_pretty(output)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
