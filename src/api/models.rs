// Wire shapes exchanged with the governance backend
// Only the fields the dashboard displays or sends are modelled

use serde::{Deserialize, Serialize};

/// Agent record as returned by GET /get_agents and GET /get_agent/:id
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Agent {
    pub id: i64,
    /// Resource-group name
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub owner_email: String,
    #[serde(default)]
    pub model_base: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub deployment_status: Option<String>,
}

/// Spend reported by the agent's budget
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrentSpend {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

/// GET /get_agent/:id payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentDetail {
    pub agent: Agent,
    pub budget: f64,
    /// Missing spend is treated as zero
    #[serde(default)]
    pub current_spend: CurrentSpend,
}

/// Knowledge source attached to an agent
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KnowledgeSource {
    #[allow(dead_code)] // Not displayed; rows are listed in creation order
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub approved: bool,
}

impl KnowledgeSource {
    pub fn approval_label(&self) -> &'static str {
        if self.approved {
            "Approved"
        } else {
            "Waiting for approval"
        }
    }
}

/// POST /new_agent body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAgentRequest {
    pub name: String,
    pub description: String,
    pub owner: String,
    pub owner_email: String,
    pub model_base: String,
    pub location: String,
    pub budget: f64,
}

/// POST /agents/:id/knowledge_sources body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewKnowledgeSource {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub agent_id: i64,
    pub user_input: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub assistant_reply: String,
}

/// `{ "message": ... }` replies from create and delete
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body produced by the backend for every non-2xx response
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_detail_without_spend() {
        let detail: AgentDetail = serde_json::from_value(serde_json::json!({
            "message": "Success",
            "agent": {
                "id": 4,
                "name": "agent-faq-rg",
                "display_name": "faq",
                "active": false,
                "status": "Waiting for approval",
                "budget": 12.5
            },
            "budget": 12.5
        }))
        .unwrap();

        assert_eq!(detail.agent.display_name, "faq");
        assert_eq!(detail.current_spend.amount, 0.0);
        assert!(detail.agent.deployment_status.is_none());
    }

    #[test]
    fn test_approval_label() {
        let mut source = KnowledgeSource {
            id: 1,
            name: "FAQ".to_string(),
            source: Some("https://website.com/".to_string()),
            approved: false,
        };
        assert_eq!(source.approval_label(), "Waiting for approval");
        source.approved = true;
        assert_eq!(source.approval_label(), "Approved");
    }

    #[test]
    fn test_knowledge_source_omits_missing_source() {
        let body = serde_json::to_value(NewKnowledgeSource {
            name: "FAQ".to_string(),
            source: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "name": "FAQ" }));
    }
}
