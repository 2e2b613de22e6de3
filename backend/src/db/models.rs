//! Governance data models
//!
//! Row types for agents, knowledge sources and the association between them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status given to every newly created agent
pub const PENDING_APPROVAL_STATUS: &str = "Waiting for approval";

/// Deployment status after a successful model deployment
pub const DEPLOYMENT_DEPLOYED: &str = "Deployed";

/// Deployment status after a failed model deployment
pub const DEPLOYMENT_FAILED: &str = "Failed";

/// A Copilot agent and the cloud resources provisioned for it
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Agent {
    /// Database identifier
    pub id: i64,
    /// Resource group name (`agent-{display_name}-rg`)
    pub name: String,
    /// Name entered when the agent was created
    pub display_name: String,
    /// Free-text description
    pub description: String,
    /// Owner of the agent
    pub owner: String,
    /// Owner's email, receives budget notifications
    pub owner_email: String,
    /// Model label chosen at creation
    pub model_base: String,
    /// Cloud region
    pub location: String,
    /// Whether the agent is enabled
    pub active: bool,
    /// Lifecycle status label
    pub status: String,
    /// Monthly budget
    pub budget: f64,
    /// AI project discovery URL
    pub workspace: Option<String>,
    /// Azure OpenAI endpoint
    pub openai_endpoint: Option<String>,
    /// Azure OpenAI key, never sent to clients
    #[serde(skip_serializing, default)]
    pub openai_api_key: Option<String>,
    /// Model deployment name
    pub deployment_name: Option<String>,
    /// Outcome of the model deployment
    pub deployment_status: Option<String>,
}

/// Fields needed to insert a new agent row
#[derive(Debug, Clone)]
pub struct NewAgent {
    /// Resource group name
    pub name: String,
    /// Name entered when the agent was created
    pub display_name: String,
    /// Free-text description
    pub description: String,
    /// Owner of the agent
    pub owner: String,
    /// Owner's email
    pub owner_email: String,
    /// Model label
    pub model_base: String,
    /// Cloud region
    pub location: String,
    /// Monthly budget
    pub budget: f64,
}

/// A file or URL attached to agents as context
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct KnowledgeSource {
    /// Database identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// File name or URL
    pub source: Option<String>,
    /// Approval flag, false until approved out of band
    pub approved: bool,
}

impl KnowledgeSource {
    /// Human-readable approval label
    pub fn approval_label(&self) -> &'static str {
        if self.approved {
            "Approved"
        } else {
            PENDING_APPROVAL_STATUS
        }
    }
}

/// Link between an agent and a knowledge source
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct AgentKnowledgeSource {
    /// Database identifier
    pub id: i64,
    /// Linked agent
    pub agent_id: i64,
    /// Linked knowledge source
    pub knowledge_id: i64,
}
