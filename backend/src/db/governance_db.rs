//! Governance database operations
//!
//! Handles all database interactions for agents and knowledge sources.

use crate::db::models::{
    Agent, AgentKnowledgeSource, KnowledgeSource, NewAgent, PENDING_APPROVAL_STATUS,
};
use crate::error::AppError;
use anyhow::anyhow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

const AGENT_COLUMNS: &str = "id, name, display_name, description, owner, owner_email, \
     model_base, location, active, status, budget, workspace, openai_endpoint, \
     openai_api_key, deployment_name, deployment_status";

/// Database connection pool for the agent registry
#[derive(Clone)]
pub struct GovernanceDb {
    pool: SqlitePool,
}

impl GovernanceDb {
    /// Initialize database connection pool
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    ///
    /// # Returns
    /// * `Ok(GovernanceDb)` if successful
    /// * `Err(AppError)` if connection failed
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        // Ensure parent directory exists
        if let Some(parent) = PathBuf::from(db_path.trim_start_matches("sqlite:")).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Internal(anyhow!("Failed to create db directory: {}", e))
                })?;
            }
        }

        let connection_string = if db_path.starts_with("sqlite:") {
            db_path.to_string()
        } else {
            format!("sqlite:{}", db_path)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| AppError::Internal(anyhow!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to connect to database: {}", e)))?;

        info!("Connected to SQLite database at: {}", db_path);

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");

        let migration_sql = include_str!("../../migrations/001_create_governance.sql");

        for statement in split_statements(migration_sql) {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow!(
                        "Migration failed: {} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Insert a new agent awaiting approval and return the stored row
    ///
    /// Agent names are unique; inserting a taken name yields
    /// `AppError::AgentExists`.
    pub async fn create_agent(&self, agent: &NewAgent) -> Result<Agent, AppError> {
        let id = sqlx::query(
            "INSERT INTO agents (name, display_name, description, owner, owner_email, \
             model_base, location, active, status, budget) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(&agent.name)
        .bind(&agent.display_name)
        .bind(&agent.description)
        .bind(&agent.owner)
        .bind(&agent.owner_email)
        .bind(&agent.model_base)
        .bind(&agent.location)
        .bind(PENDING_APPROVAL_STATUS)
        .bind(agent.budget)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::AgentExists(agent.name.clone())
            }
            e => AppError::Internal(anyhow!("Failed to create agent: {}", e)),
        })?
        .last_insert_rowid();

        debug!(agent_id = id, name = %agent.name, "Created agent");

        self.get_agent(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow!("Agent not found after creation")))
    }

    /// Get an agent by ID
    pub async fn get_agent(&self, id: i64) -> Result<Option<Agent>, AppError> {
        let query = format!("SELECT {} FROM agents WHERE id = ?", AGENT_COLUMNS);
        sqlx::query_as::<_, Agent>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to fetch agent: {}", e)))
    }

    /// Get an agent by its resource group name
    pub async fn get_agent_by_name(&self, name: &str) -> Result<Option<Agent>, AppError> {
        let query = format!("SELECT {} FROM agents WHERE name = ?", AGENT_COLUMNS);
        sqlx::query_as::<_, Agent>(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to fetch agent: {}", e)))
    }

    /// Get all agents, ordered by ID
    pub async fn list_agents(&self) -> Result<Vec<Agent>, AppError> {
        let query = format!("SELECT {} FROM agents ORDER BY id ASC", AGENT_COLUMNS);
        sqlx::query_as::<_, Agent>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to fetch agents: {}", e)))
    }

    /// Store the endpoints and credentials produced by provisioning
    pub async fn update_agent_provisioning(
        &self,
        id: i64,
        workspace: Option<&str>,
        openai_endpoint: Option<&str>,
        openai_api_key: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE agents SET workspace = ?, openai_endpoint = ?, openai_api_key = ? WHERE id = ?",
        )
        .bind(workspace)
        .bind(openai_endpoint)
        .bind(openai_api_key)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow!("Failed to update agent: {}", e)))?;

        debug!(agent_id = id, "Stored provisioning details");
        Ok(())
    }

    /// Record the model deployment outcome
    pub async fn set_deployment(
        &self,
        id: i64,
        deployment_name: Option<&str>,
        deployment_status: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE agents SET deployment_name = ?, deployment_status = ? WHERE id = ?")
            .bind(deployment_name)
            .bind(deployment_status)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to update deployment: {}", e)))?;

        debug!(agent_id = id, status = deployment_status, "Recorded deployment");
        Ok(())
    }

    /// Delete an agent (cascades to knowledge source links)
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete_agent(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM agents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to delete agent: {}", e)))?;

        debug!(agent_id = id, "Deleted agent");
        Ok(result.rows_affected() > 0)
    }

    /// Create an unapproved knowledge source
    pub async fn create_knowledge_source(
        &self,
        name: &str,
        source: Option<&str>,
    ) -> Result<KnowledgeSource, AppError> {
        let id = sqlx::query("INSERT INTO knowledge_sources (name, source, approved) VALUES (?, ?, 0)")
            .bind(name)
            .bind(source)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to create knowledge source: {}", e)))?
            .last_insert_rowid();

        debug!(knowledge_id = id, name, "Created knowledge source");

        Ok(KnowledgeSource {
            id,
            name: name.to_string(),
            source: source.map(str::to_string),
            approved: false,
        })
    }

    /// Get a knowledge source by ID
    pub async fn get_knowledge_source(&self, id: i64) -> Result<Option<KnowledgeSource>, AppError> {
        sqlx::query_as::<_, KnowledgeSource>(
            "SELECT id, name, source, approved FROM knowledge_sources WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow!("Failed to fetch knowledge source: {}", e)))
    }

    /// Get all knowledge sources, ordered by ID
    pub async fn list_knowledge_sources(&self) -> Result<Vec<KnowledgeSource>, AppError> {
        sqlx::query_as::<_, KnowledgeSource>(
            "SELECT id, name, source, approved FROM knowledge_sources ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow!("Failed to fetch knowledge sources: {}", e)))
    }

    /// Attach a knowledge source to an agent
    pub async fn link_knowledge_source(
        &self,
        agent_id: i64,
        knowledge_id: i64,
    ) -> Result<AgentKnowledgeSource, AppError> {
        let id = sqlx::query(
            "INSERT INTO agent_knowledge_sources (agent_id, knowledge_id) VALUES (?, ?)",
        )
        .bind(agent_id)
        .bind(knowledge_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow!("Failed to link knowledge source: {}", e)))?
        .last_insert_rowid();

        debug!(agent_id, knowledge_id, "Linked knowledge source");

        Ok(AgentKnowledgeSource {
            id,
            agent_id,
            knowledge_id,
        })
    }

    /// Create a knowledge source and attach it to an agent in one transaction
    ///
    /// Nothing is stored when the agent does not exist (or disappears
    /// meanwhile); that case yields `AppError::AgentNotFound`.
    pub async fn create_agent_knowledge_source(
        &self,
        agent_id: i64,
        name: &str,
        source: Option<&str>,
    ) -> Result<KnowledgeSource, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to begin transaction: {}", e)))?;

        let id = sqlx::query("INSERT INTO knowledge_sources (name, source, approved) VALUES (?, ?, 0)")
            .bind(name)
            .bind(source)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to create knowledge source: {}", e)))?
            .last_insert_rowid();

        sqlx::query("INSERT INTO agent_knowledge_sources (agent_id, knowledge_id) VALUES (?, ?)")
            .bind(agent_id)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    AppError::AgentNotFound(agent_id)
                }
                e => AppError::Internal(anyhow!("Failed to link knowledge source: {}", e)),
            })?;

        tx.commit()
            .await
            .map_err(|e| AppError::Internal(anyhow!("Failed to commit knowledge source: {}", e)))?;

        debug!(agent_id, knowledge_id = id, name, "Created agent knowledge source");

        Ok(KnowledgeSource {
            id,
            name: name.to_string(),
            source: source.map(str::to_string),
            approved: false,
        })
    }

    /// Get the knowledge sources attached to an agent
    pub async fn list_agent_knowledge_sources(
        &self,
        agent_id: i64,
    ) -> Result<Vec<KnowledgeSource>, AppError> {
        sqlx::query_as::<_, KnowledgeSource>(
            "SELECT ks.id, ks.name, ks.source, ks.approved FROM knowledge_sources ks \
             JOIN agent_knowledge_sources aks ON aks.knowledge_id = ks.id \
             WHERE aks.agent_id = ? ORDER BY ks.id ASC",
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow!("Failed to fetch knowledge sources: {}", e)))
    }

    /// Get the database pool (for advanced operations if needed)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Split a migration script into executable statements
///
/// Comment lines and trailing `--` comments are dropped.
fn split_statements(sql: &str) -> Vec<String> {
    let mut cleaned_sql = String::new();
    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        let without_comments = match trimmed.find("--") {
            Some(comment_pos) => &trimmed[..comment_pos],
            None => trimmed,
        };
        cleaned_sql.push_str(without_comments.trim());
        cleaned_sql.push(' ');
    }

    cleaned_sql
        .split(';')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
