//! Errors raised by the MCP surface itself, before a request reaches the
//! cache manager.

use precache_core::ConfigError;
use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Tool parameters rejected (e.g., unparseable URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Configuration could not produce a cache manager.
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),

    /// Tool output could not be encoded.
    #[error("SERIALIZE_FAILED: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<ServerError> for McpError {
    fn from(err: ServerError) -> Self {
        let code = match &err {
            ServerError::InvalidInput(_) => -32602,
            ServerError::Config(_) => -32010,
            ServerError::Serialize(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
