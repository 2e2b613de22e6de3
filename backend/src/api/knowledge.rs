//! Knowledge source API handlers
//!
//! Knowledge sources are stored as name + file/URL reference. Nothing is
//! ingested and no endpoint changes the approval flag.

use crate::db::{AgentKnowledgeSource, KnowledgeSource};
use crate::error::AppError;
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

/// Create knowledge source request
#[derive(Debug, Deserialize)]
pub struct CreateKnowledgeSourceRequest {
    /// Display name
    pub name: String,
    /// File name or URL
    #[serde(default)]
    pub source: Option<String>,
}

/// Link an existing knowledge source to an agent
#[derive(Debug, Deserialize)]
pub struct LinkKnowledgeSourceRequest {
    /// Agent to attach to
    pub agent_id: i64,
    /// Knowledge source to attach
    pub knowledge_id: i64,
}

impl CreateKnowledgeSourceRequest {
    fn validated(&self) -> Result<(&str, Option<&str>), AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidRequest(
                "Knowledge source name cannot be empty".to_string(),
            ));
        }
        let source = self
            .source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        Ok((name, source))
    }
}

/// GET /knowledge_sources - List all knowledge sources
pub async fn list_knowledge_sources(
    State(state): State<SharedState>,
) -> Result<Json<Vec<KnowledgeSource>>, AppError> {
    Ok(Json(state.db.list_knowledge_sources().await?))
}

/// POST /knowledge_sources - Create a knowledge source
pub async fn create_knowledge_source(
    State(state): State<SharedState>,
    Json(request): Json<CreateKnowledgeSourceRequest>,
) -> Result<(StatusCode, Json<KnowledgeSource>), AppError> {
    let (name, source) = request.validated()?;
    let created = state.db.create_knowledge_source(name, source).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /agent_knowledge_sources - Attach an existing knowledge source to an agent
pub async fn link_knowledge_source(
    State(state): State<SharedState>,
    Json(request): Json<LinkKnowledgeSourceRequest>,
) -> Result<(StatusCode, Json<AgentKnowledgeSource>), AppError> {
    if state.db.get_agent(request.agent_id).await?.is_none() {
        return Err(AppError::AgentNotFound(request.agent_id));
    }
    if state
        .db
        .get_knowledge_source(request.knowledge_id)
        .await?
        .is_none()
    {
        return Err(AppError::KnowledgeSourceNotFound(request.knowledge_id));
    }

    let link = state
        .db
        .link_knowledge_source(request.agent_id, request.knowledge_id)
        .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// GET /agents/:id/knowledge_sources - Knowledge sources attached to an agent
pub async fn list_agent_knowledge_sources(
    State(state): State<SharedState>,
    Path(agent_id): Path<i64>,
) -> Result<Json<Vec<KnowledgeSource>>, AppError> {
    if state.db.get_agent(agent_id).await?.is_none() {
        return Err(AppError::AgentNotFound(agent_id));
    }
    Ok(Json(state.db.list_agent_knowledge_sources(agent_id).await?))
}

/// POST /agents/:id/knowledge_sources - Create a knowledge source and attach it
pub async fn add_agent_knowledge_source(
    State(state): State<SharedState>,
    Path(agent_id): Path<i64>,
    Json(request): Json<CreateKnowledgeSourceRequest>,
) -> Result<(StatusCode, Json<KnowledgeSource>), AppError> {
    let (name, source) = request.validated()?;
    if state.db.get_agent(agent_id).await?.is_none() {
        return Err(AppError::AgentNotFound(agent_id));
    }

    let created = state
        .db
        .create_agent_knowledge_source(agent_id, name, source)
        .await?;

    tracing::info!(agent_id, knowledge_id = created.id, "Added knowledge source");
    Ok((StatusCode::CREATED, Json(created)))
}
