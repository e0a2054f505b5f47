//! sw_message tool implementation.
//!
//! Posts a control message to the waiting (or installing) version.

use precache_worker::RegistrationStatus;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::state::AppState;

/// Parameters for the sw_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwMessageParams {
    /// Message payload, e.g. `{"type": "SKIP_WAITING"}`.
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwMessageOutput {
    /// Whether a version recognised the message.
    pub recognised: bool,
    pub registration: RegistrationStatus,
}

pub async fn message_impl(state: &AppState, params: SwMessageParams) -> Result<CallToolResult, McpError> {
    let recognised = state.registration.post_message(&params.payload).await?;
    let output = SwMessageOutput { recognised, registration: state.registration.status().await };
    Ok(json_result(&output)?)
}
