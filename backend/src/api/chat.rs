//! Chat API endpoint
//!
//! Forwards a user's message to the agent's own Azure OpenAI deployment.

use crate::chat::call_chat_completion;
use crate::error::AppError;
use crate::services::provisioning::deployment_name;
use crate::state::SharedState;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

/// Maximum chat input length in characters
pub const MAX_INPUT_LENGTH: usize = 10_000;

/// Chat completion request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Agent to talk to
    pub agent_id: i64,
    /// The user's message
    pub user_input: String,
}

/// Chat completion response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The assistant's reply
    pub assistant_reply: String,
}

/// Validate chat input
///
/// # Returns
/// * `Ok(())` - Input is valid
/// * `Err(AppError)` - Input is empty or too long
pub fn validate_input(input: &str) -> Result<(), AppError> {
    if input.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Chat input cannot be empty".to_string(),
        ));
    }
    // Counted on the raw input, which is what gets forwarded
    if input.chars().count() > MAX_INPUT_LENGTH {
        return Err(AppError::InvalidRequest(format!(
            "Chat input exceeds maximum length of {} characters",
            MAX_INPUT_LENGTH
        )));
    }
    Ok(())
}

/// POST /chat_completion - Chat with an agent
pub async fn chat_completion(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    validate_input(&request.user_input)?;

    let agent = state
        .db
        .get_agent(request.agent_id)
        .await?
        .ok_or(AppError::AgentNotFound(request.agent_id))?;

    let (endpoint, api_key) = match (&agent.openai_endpoint, &agent.openai_api_key) {
        (Some(endpoint), Some(api_key)) if !endpoint.is_empty() && !api_key.is_empty() => {
            (endpoint, api_key)
        }
        _ => return Err(AppError::DeploymentUnavailable),
    };
    let deployment = agent
        .deployment_name
        .clone()
        .unwrap_or_else(|| deployment_name(agent.id));

    let assistant_reply = call_chat_completion(
        &state.http_client,
        endpoint,
        api_key,
        &deployment,
        &state.openai.api_version,
        &request.user_input,
    )
    .await?;

    Ok(Json(ChatResponse { assistant_reply }))
}
