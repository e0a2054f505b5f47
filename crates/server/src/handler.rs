//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use std::sync::Arc;

use crate::state::AppState;
use crate::tools::cache::{CacheGetParams, CacheKeysParams, get_impl, keys_impl};
use crate::tools::{
    ClientCloseParams, SwFetchParams, SwInstallParams, SwMessageParams, close_impl, fetch_impl, install_impl,
    message_impl, status_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for mcp-precache.
#[derive(Clone)]
pub struct McpPrecacheServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl McpPrecacheServer {
    /// Create a new server handler.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Install a cache version: precache every manifest asset, then activate it when no client holds the previous version."
    )]
    async fn sw_install(&self, params: Parameters<SwInstallParams>) -> Result<CallToolResult, McpError> {
        install_impl(&self.state, params.0).await
    }

    /// Fetch through the active cache version.
    ///
    /// HTML requests are network-first with an offline fallback; other GETs
    /// are cache-first. Declined requests go straight to the network.
    #[tool(
        description = "Fetch a URL through the offline cache manager. Reports whether the response came from the network, the cache, the offline page, or a passthrough."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.state, params.0).await
    }

    #[tool(description = "Post a control message (e.g. {\"type\": \"SKIP_WAITING\"}) to the waiting cache version.")]
    async fn sw_message(&self, params: Parameters<SwMessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.state, params.0).await
    }

    #[tool(description = "Show installing, waiting and active cache versions, open clients, and store names.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.state).await
    }

    #[tool(description = "Close a client (page unload). The last client closing lets a waiting version activate.")]
    async fn client_close(&self, params: Parameters<ClientCloseParams>) -> Result<CallToolResult, McpError> {
        close_impl(&self.state, params.0).await
    }

    #[tool(description = "List cache store names, or the requests stored in one store.")]
    async fn cache_keys(&self, params: Parameters<CacheKeysParams>) -> Result<CallToolResult, McpError> {
        keys_impl(&self.state, params.0).await
    }

    #[tool(description = "Retrieve a stored response snapshot by store name and request URL.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.state, params.0).await
    }
}

impl ServerHandler for McpPrecacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mcp-precache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
