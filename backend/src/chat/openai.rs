//! Azure OpenAI client
//!
//! Sends a single-turn chat completion to an agent's own deployment.

use crate::chat::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::error::AppError;

/// System prompt given to every agent
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Call an Azure OpenAI deployment with the user's input
///
/// # Arguments
/// * `endpoint` - Account endpoint, e.g. `https://agent1openai.openai.azure.com/`
/// * `api_key` - Account key
/// * `deployment` - Deployment name
/// * `api_version` - Chat completions API version
/// * `user_input` - The user's message
///
/// # Returns
/// * `Ok(String)` - The assistant's reply
/// * `Err(AppError::ChatCompletion)` - If the request failed or the reply was empty
pub async fn call_chat_completion(
    client: &reqwest::Client,
    endpoint: &str,
    api_key: &str,
    deployment: &str,
    api_version: &str,
    user_input: &str,
) -> Result<String, AppError> {
    let url = format!(
        "{}/openai/deployments/{}/chat/completions",
        endpoint.trim_end_matches('/'),
        deployment
    );

    let request_body = ChatCompletionRequest {
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user_input),
        ],
    };

    tracing::debug!(
        url = %url,
        deployment = %deployment,
        input_len = user_input.len(),
        "Calling Azure OpenAI"
    );

    let response = client
        .post(&url)
        .query(&[("api-version", api_version)])
        .header("api-key", api_key)
        .json(&request_body)
        .send()
        .await
        .map_err(|e| AppError::ChatCompletion(format!("Failed to send request: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());

        tracing::error!(
            status_code = status.as_u16(),
            error_body = %error_body,
            "Azure OpenAI returned error status"
        );

        return Err(AppError::ChatCompletion(format!(
            "Azure OpenAI returned error status {}: {}",
            status.as_u16(),
            error_body
        )));
    }

    let response_body = response
        .text()
        .await
        .map_err(|e| AppError::ChatCompletion(format!("Failed to read response body: {}", e)))?;

    let parsed: ChatCompletionResponse = serde_json::from_str(&response_body).map_err(|e| {
        AppError::ChatCompletion(format!(
            "Failed to parse response: {} - Response body: {}",
            e, response_body
        ))
    })?;

    let reply = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .ok_or_else(|| AppError::ChatCompletion("Response contains no reply".to_string()))?;

    tracing::debug!(reply_len = reply.len(), "Received chat completion");

    Ok(reply)
}
