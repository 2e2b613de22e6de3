//! Agent management API handlers
//!
//! Contains HTTP request handlers for creating, listing, inspecting and
//! deleting agents.

use crate::cloud::CurrentSpend;
use crate::db::Agent;
use crate::error::AppError;
use crate::services::provisioning::{self, AgentSpec};
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

/// Create agent request
///
/// `active` and `status` are accepted for compatibility but ignored: new
/// agents always start inactive and waiting for approval.
#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    /// Name for the new agent
    pub name: String,
    /// Friendly name for the AI project (defaults to `name`)
    #[serde(default)]
    pub display_name: Option<String>,
    /// Description of the agent
    #[serde(default)]
    pub description: String,
    /// Owner of the agent
    #[serde(default)]
    pub owner: String,
    /// Owner's email
    #[serde(default)]
    pub owner_email: String,
    /// Model label
    #[serde(default)]
    pub model_base: String,
    /// Cloud region
    pub location: String,
    /// Ignored
    #[serde(default)]
    #[allow(dead_code)]
    pub active: Option<bool>,
    /// Ignored
    #[serde(default)]
    #[allow(dead_code)]
    pub status: Option<String>,
    /// Monthly budget
    pub budget: f64,
}

impl From<CreateAgentRequest> for AgentSpec {
    fn from(request: CreateAgentRequest) -> Self {
        let display_name = request
            .display_name
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| request.name.clone());
        Self {
            name: request.name,
            display_name,
            description: request.description,
            owner: request.owner,
            owner_email: request.owner_email,
            model_base: request.model_base,
            location: request.location,
            budget: request.budget,
        }
    }
}

/// Message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
    /// Status indicator (e.g., "ok", "error")
    pub status: String,
}

impl MessageResponse {
    /// Successful message
    pub fn ok(message: String) -> Self {
        Self {
            message,
            status: "ok".to_string(),
        }
    }
}

/// Single agent with its budget and spend
#[derive(Debug, Serialize)]
pub struct AgentDetailResponse {
    /// Always "Success"
    pub message: String,
    /// The agent record
    pub agent: Agent,
    /// Monthly budget
    pub budget: f64,
    /// Spend reported by the budget, zero when none is reported
    pub current_spend: CurrentSpend,
}

/// Query parameters for agent deletion
#[derive(Debug, Deserialize)]
pub struct DeleteAgentParams {
    /// Agent to delete
    pub id: i64,
}

/// POST /new_agent - Create and provision a new agent
pub async fn new_agent(
    State(state): State<SharedState>,
    Json(request): Json<CreateAgentRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let spec = AgentSpec::from(request);
    let outcome = provisioning::provision_agent(
        &state.db,
        state.provisioner.as_ref(),
        &state.openai,
        &spec,
        chrono::Utc::now(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::ok(outcome.message)),
    ))
}

/// GET /get_agents - List all agents
pub async fn get_agents(State(state): State<SharedState>) -> Result<Json<Vec<Agent>>, AppError> {
    let agents = state.db.list_agents().await?;
    Ok(Json(agents))
}

/// GET /get_agent/:id - Get an agent with its budget and current spend
pub async fn get_agent(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<AgentDetailResponse>, AppError> {
    let agent = state
        .db
        .get_agent(id)
        .await?
        .ok_or(AppError::AgentNotFound(id))?;

    let current_spend = state
        .provisioner
        .current_spend(&agent.name, &provisioning::budget_name(&agent.name))
        .await?
        .unwrap_or_else(CurrentSpend::zero);

    Ok(Json(AgentDetailResponse {
        message: "Success".to_string(),
        budget: agent.budget,
        agent,
        current_spend,
    }))
}

/// DELETE /delete_agent?id=N - Delete an agent and its resource group
pub async fn delete_agent(
    State(state): State<SharedState>,
    Query(params): Query<DeleteAgentParams>,
) -> Result<Json<MessageResponse>, AppError> {
    let agent = state
        .db
        .get_agent(params.id)
        .await?
        .ok_or(AppError::AgentNotFound(params.id))?;

    if let Err(e) = state.provisioner.delete_resource_group(&agent.name).await {
        tracing::warn!(
            resource_group = %agent.name,
            error = %e,
            "Failed to delete resource group"
        );
    }

    state.db.delete_agent(agent.id).await?;

    Ok(Json(MessageResponse::ok(format!(
        "Record with ID {} has been deleted.",
        agent.id
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{create_test_agent, create_test_state, create_test_state_with};
    use crate::cloud::{
        BudgetPlan, CloudError, LocalProvisioner, ModelDeployment, OpenAiAccount, Provisioner,
        WorkspacePlan,
    };
    use async_trait::async_trait;
    use axum::response::IntoResponse;
    use std::sync::Arc;

    /// Control plane that rejects deletions and spend reads
    struct UnreachableBilling {
        inner: LocalProvisioner,
    }

    fn unavailable() -> CloudError {
        CloudError::Status {
            status: 503,
            body: "service unavailable".to_string(),
        }
    }

    #[async_trait]
    impl Provisioner for UnreachableBilling {
        async fn create_resource_group(&self, name: &str, location: &str) -> Result<(), CloudError> {
            self.inner.create_resource_group(name, location).await
        }

        async fn delete_resource_group(&self, _: &str) -> Result<(), CloudError> {
            Err(unavailable())
        }

        async fn create_budget(&self, rg: &str, plan: &BudgetPlan) -> Result<(), CloudError> {
            self.inner.create_budget(rg, plan).await
        }

        async fn current_spend(
            &self,
            _: &str,
            _: &str,
        ) -> Result<Option<CurrentSpend>, CloudError> {
            Err(unavailable())
        }

        async fn create_workspace(
            &self,
            rg: &str,
            plan: &WorkspacePlan,
        ) -> Result<Option<String>, CloudError> {
            self.inner.create_workspace(rg, plan).await
        }

        async fn create_openai_account(
            &self,
            rg: &str,
            account_name: &str,
            location: &str,
        ) -> Result<OpenAiAccount, CloudError> {
            self.inner
                .create_openai_account(rg, account_name, location)
                .await
        }

        async fn deploy_model(
            &self,
            rg: &str,
            account_name: &str,
            deployment: &ModelDeployment,
        ) -> Result<(), CloudError> {
            self.inner.deploy_model(rg, account_name, deployment).await
        }
    }

    async fn create_unreachable_billing_state() -> (SharedState, tempfile::TempDir) {
        create_test_state_with(Arc::new(UnreachableBilling {
            inner: LocalProvisioner::new(),
        }))
        .await
    }

    fn create_request(name: &str) -> CreateAgentRequest {
        CreateAgentRequest {
            name: name.to_string(),
            display_name: None,
            description: "Test agent".to_string(),
            owner: "John Doe".to_string(),
            owner_email: "john@example.com".to_string(),
            model_base: "GPT 3.5".to_string(),
            location: "uksouth".to_string(),
            active: Some(true),
            status: Some("Approved".to_string()),
            budget: 12.0,
        }
    }

    #[tokio::test]
    async fn test_get_agents_empty() {
        let (state, _temp_dir) = create_test_state().await;
        let response = get_agents(State(state)).await.unwrap();
        assert!(response.0.is_empty());
    }

    #[tokio::test]
    async fn test_new_agent() {
        let (state, _temp_dir) = create_test_state().await;

        let (status, response) = new_agent(State(state.clone()), Json(create_request("faq")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(response
            .message
            .starts_with("Provisioned resource group agent-faq-rg"));

        let agents = get_agents(State(state)).await.unwrap().0;
        assert_eq!(agents.len(), 1);
        // Request-supplied status and active flag are ignored
        assert!(!agents[0].active);
        assert_eq!(agents[0].status, "Waiting for approval");
    }

    #[tokio::test]
    async fn test_get_agent_with_zero_spend() {
        let (state, _temp_dir) = create_test_state().await;
        new_agent(State(state.clone()), Json(create_request("faq")))
            .await
            .unwrap();
        let id = state.db.list_agents().await.unwrap()[0].id;

        let response = get_agent(State(state), Path(id)).await.unwrap().0;
        assert_eq!(response.message, "Success");
        assert_eq!(response.agent.display_name, "faq");
        assert_eq!(response.budget, 12.0);
        assert_eq!(response.current_spend, CurrentSpend::zero());
    }

    #[tokio::test]
    async fn test_get_agent_not_found() {
        let (state, _temp_dir) = create_test_state().await;
        let result = get_agent(State(state), Path(42)).await;
        match result.unwrap_err() {
            AppError::AgentNotFound(id) => assert_eq!(id, 42),
            other => panic!("Expected AgentNotFound error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_agent() {
        let (state, _temp_dir) = create_test_state().await;
        new_agent(State(state.clone()), Json(create_request("faq")))
            .await
            .unwrap();
        let id = state.db.list_agents().await.unwrap()[0].id;

        let response = delete_agent(State(state.clone()), Query(DeleteAgentParams { id }))
            .await
            .unwrap();
        assert_eq!(
            response.message,
            format!("Record with ID {} has been deleted.", id)
        );

        let again = delete_agent(State(state), Query(DeleteAgentParams { id })).await;
        assert!(matches!(again, Err(AppError::AgentNotFound(_))));
    }

    #[tokio::test]
    async fn test_get_agent_spend_failure_is_bad_gateway() {
        let (state, _temp_dir) = create_unreachable_billing_state().await;
        let agent = create_test_agent(&state, "faq").await;

        let error = get_agent(State(state), Path(agent.id)).await.unwrap_err();
        assert!(matches!(error, AppError::Cloud(CloudError::Status { status: 503, .. })));
        assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_delete_agent_when_resource_group_deletion_fails() {
        let (state, _temp_dir) = create_unreachable_billing_state().await;
        let agent = create_test_agent(&state, "faq").await;

        let response = delete_agent(
            State(state.clone()),
            Query(DeleteAgentParams { id: agent.id }),
        )
        .await
        .unwrap();
        assert_eq!(
            response.message,
            format!("Record with ID {} has been deleted.", agent.id)
        );
        assert!(state.db.get_agent(agent.id).await.unwrap().is_none());
    }

    #[test]
    fn test_display_name_defaults_to_name() {
        let spec = AgentSpec::from(create_request("faq"));
        assert_eq!(spec.display_name, "faq");

        let mut request = create_request("faq");
        request.display_name = Some("FAQ Bot".to_string());
        assert_eq!(AgentSpec::from(request).display_name, "FAQ Bot");
    }
}
