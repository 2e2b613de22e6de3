// Application state
// Holds the database, the cloud provisioner and the outbound HTTP client

use crate::cloud::Provisioner;
use crate::config::OpenAiConfig;
use crate::db::GovernanceDb;
use std::sync::Arc;

/// State shared by all request handlers
pub type SharedState = Arc<AppState>;

/// Main application state
pub struct AppState {
    /// Agent registry and knowledge sources
    pub db: GovernanceDb,
    /// Control plane used to create and inspect agent resources
    pub provisioner: Arc<dyn Provisioner>,
    /// Shared HTTP client (connection pooling) for chat completions
    pub http_client: reqwest::Client,
    /// Model and API version settings
    pub openai: OpenAiConfig,
}

impl AppState {
    /// Create application state
    pub fn new(
        db: GovernanceDb,
        provisioner: Arc<dyn Provisioner>,
        http_client: reqwest::Client,
        openai: OpenAiConfig,
    ) -> Self {
        Self {
            db,
            provisioner,
            http_client,
            openai,
        }
    }

    /// Wrap the state for use with axum's `State` extractor
    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}
