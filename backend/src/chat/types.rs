//! Chat completion wire types

use serde::{Deserialize, Serialize};

/// Chat completion request body
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// Conversation so far
    pub messages: Vec<ChatMessage>,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`
    pub role: String,
    /// Message text
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    /// System prompt message
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.to_string()),
        }
    }

    /// User message
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.to_string()),
        }
    }
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// Completion choices
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// Generated message
    pub message: ChatMessage,
}
