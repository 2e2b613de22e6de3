//! API module
//!
//! Contains HTTP request handlers for the governance endpoints

pub mod agents;
pub mod chat;
pub mod knowledge;

use axum::Json;
use serde::Serialize;

/// Root greeting
#[derive(Serialize)]
pub struct HelloResponse {
    /// Greeting
    pub message: String,
}

/// Health check payload
#[derive(Serialize)]
pub struct HealthResponse {
    /// Health indicator
    pub status: String,
    /// Crate version
    pub version: String,
    /// Human-readable message
    pub message: String,
}

/// GET / - Greeting
pub async fn hello_world() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello World".to_string(),
    })
}

/// GET /api/health - Health check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Backend is healthy".to_string(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::cloud::{LocalProvisioner, Provisioner};
    use crate::config::OpenAiConfig;
    use crate::db::{Agent, GovernanceDb, NewAgent};
    use crate::state::{AppState, SharedState};
    use std::sync::Arc;
    use tempfile::TempDir;

    pub async fn create_test_state() -> (SharedState, TempDir) {
        create_test_state_with(Arc::new(LocalProvisioner::new())).await
    }

    pub async fn create_test_state_with(
        provisioner: Arc<dyn Provisioner>,
    ) -> (SharedState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = GovernanceDb::new(db_path.to_str().unwrap())
            .await
            .expect("Failed to create test database");
        let state = AppState::new(
            db,
            provisioner,
            reqwest::Client::new(),
            OpenAiConfig::default(),
        );
        (state.shared(), temp_dir)
    }

    pub async fn create_test_agent(state: &SharedState, name: &str) -> Agent {
        state
            .db
            .create_agent(&NewAgent {
                name: format!("agent-{}-rg", name),
                display_name: name.to_string(),
                description: "Test agent".to_string(),
                owner: "John Doe".to_string(),
                owner_email: "john@example.com".to_string(),
                model_base: "GPT 3.5".to_string(),
                location: "uksouth".to_string(),
                budget: 10.0,
            })
            .await
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hello_world() {
        assert_eq!(hello_world().await.message, "Hello World");
    }

    #[tokio::test]
    async fn test_health_check() {
        let health = health_check().await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }
}
