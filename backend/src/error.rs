//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// All errors that can occur in the application are represented by this enum.
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Agent with the given ID was not found
    #[error("Agent not found: {0}")]
    AgentNotFound(i64),

    /// An agent with the same resource group already exists
    #[error("Agent already exists: {0}")]
    AgentExists(String),

    /// Knowledge source with the given ID was not found
    #[error("Knowledge source not found: {0}")]
    KnowledgeSourceNotFound(i64),

    /// Request payload failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The agent has no usable OpenAI deployment
    #[error("OpenAI credentials or deployment not available.")]
    DeploymentUnavailable,

    /// A cloud provisioning call failed
    #[error("Cloud provisioning error: {0}")]
    Cloud(#[from] crate::cloud::CloudError),

    /// The chat completion upstream failed
    #[error("Failed to generate chat completion: {0}")]
    ChatCompletion(String),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::AgentNotFound(_) => StatusCode::NOT_FOUND,
            AppError::KnowledgeSourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::AgentExists(_) => StatusCode::CONFLICT,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DeploymentUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Cloud(_) => StatusCode::BAD_GATEWAY,
            AppError::ChatCompletion(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::AgentNotFound(3), StatusCode::NOT_FOUND),
            (
                AppError::AgentExists("agent-x-rg".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                AppError::InvalidRequest("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::DeploymentUnavailable,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::ChatCompletion("upstream".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_deployment_unavailable_message() {
        assert_eq!(
            AppError::DeploymentUnavailable.to_string(),
            "OpenAI credentials or deployment not available."
        );
    }
}
