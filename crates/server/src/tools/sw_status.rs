//! sw_status tool implementation.

use precache_worker::RegistrationStatus;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::Serialize;

use super::json_result;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct SwStatusOutput {
    #[serde(flatten)]
    pub registration: RegistrationStatus,
    /// Every store name, oldest first.
    pub stores: Vec<String>,
}

pub async fn status_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let output =
        SwStatusOutput { registration: state.registration.status().await, stores: state.storage.keys().await? };
    Ok(json_result(&output)?)
}
