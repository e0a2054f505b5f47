//! client_close tool implementation.
//!
//! Unloads a client. Closing the last client of the active version lets a
//! waiting version take over.

use precache_worker::RegistrationStatus;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::state::AppState;

/// Parameters for the client_close tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientCloseParams {
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientCloseOutput {
    /// False if the client was not open.
    pub closed: bool,
    pub registration: RegistrationStatus,
}

pub async fn close_impl(state: &AppState, params: ClientCloseParams) -> Result<CallToolResult, McpError> {
    let closed = state.registration.close_client(&params.client_id).await?;
    let output = ClientCloseOutput { closed, registration: state.registration.status().await };
    Ok(json_result(&output)?)
}
