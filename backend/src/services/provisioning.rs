//! Agent provisioning service
//!
//! Creates an agent's registry row together with its cloud resources:
//! resource group, budget, AI project workspace, OpenAI account and model
//! deployment.

use crate::cloud::{BudgetPlan, ModelDeployment, Provisioner, WorkspacePlan};
use crate::config::OpenAiConfig;
use crate::db::models::{DEPLOYMENT_DEPLOYED, DEPLOYMENT_FAILED};
use crate::db::{Agent, GovernanceDb, NewAgent};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Everything needed to create an agent
#[derive(Debug, Clone)]
pub struct AgentSpec {
    /// Agent name, also used in the resource group name
    pub name: String,
    /// Friendly name for the AI project
    pub display_name: String,
    /// Free-text description
    pub description: String,
    /// Owner of the agent
    pub owner: String,
    /// Owner's email
    pub owner_email: String,
    /// Model label chosen in the form
    pub model_base: String,
    /// Cloud region
    pub location: String,
    /// Monthly budget
    pub budget: f64,
}

/// Result of a successful provisioning run
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    /// The stored agent, after provisioning
    pub agent: Agent,
    /// Human-readable summary
    pub message: String,
}

/// Resource group holding an agent's resources
pub fn resource_group_name(agent_name: &str) -> String {
    format!("agent-{}-rg", agent_name.trim())
}

/// Budget attached to a resource group
pub fn budget_name(resource_group: &str) -> String {
    format!("{}-budget", resource_group)
}

/// AI project workspace of an agent
pub fn project_name(agent_id: i64) -> String {
    format!("project-agent{}", agent_id)
}

/// OpenAI account of an agent
pub fn openai_account_name(agent_id: i64) -> String {
    format!("agent{}openai", agent_id)
}

/// Model deployment of an agent
pub fn deployment_name(agent_id: i64) -> String {
    format!("gpt-3-deployment-agent{}", agent_id)
}

/// Create an agent and provision its resources
///
/// A failure before the model deployment removes the agent row again. A
/// failed deployment keeps the row with `deployment_status = "Failed"`.
///
/// # Errors
/// * `AppError::InvalidRequest` if the name is blank
/// * `AppError::AgentExists` if the resource group is already registered
/// * `AppError::Cloud` if any provisioning step fails
pub async fn provision_agent(
    db: &GovernanceDb,
    provisioner: &dyn Provisioner,
    openai: &OpenAiConfig,
    spec: &AgentSpec,
    now: DateTime<Utc>,
) -> Result<ProvisionOutcome, AppError> {
    let name = spec.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest(
            "Agent name cannot be empty".to_string(),
        ));
    }

    // The unique index on agents(name) settles concurrent creates at insert
    let rg_name = resource_group_name(name);
    if db.get_agent_by_name(&rg_name).await?.is_some() {
        return Err(AppError::AgentExists(rg_name));
    }

    provisioner
        .create_resource_group(&rg_name, &spec.location)
        .await?;

    let agent = db
        .create_agent(&NewAgent {
            name: rg_name.clone(),
            display_name: name.to_string(),
            description: spec.description.clone(),
            owner: spec.owner.clone(),
            owner_email: spec.owner_email.clone(),
            model_base: spec.model_base.clone(),
            location: spec.location.clone(),
            budget: spec.budget,
        })
        .await?;

    if let Err(e) = provision_resources(db, provisioner, spec, &agent, now).await {
        warn!(agent_id = agent.id, error = %e, "Provisioning failed, removing agent");
        if let Err(cleanup) = db.delete_agent(agent.id).await {
            warn!(agent_id = agent.id, error = %cleanup, "Failed to remove agent after provisioning error");
        }
        return Err(e);
    }

    let deployment = ModelDeployment::standard(
        deployment_name(agent.id),
        openai.model.clone(),
        openai.model_version.clone(),
    );

    match provisioner
        .deploy_model(&rg_name, &openai_account_name(agent.id), &deployment)
        .await
    {
        Ok(()) => {
            db.set_deployment(agent.id, Some(&deployment.name), DEPLOYMENT_DEPLOYED)
                .await?;
        }
        Err(e) => {
            warn!(agent_id = agent.id, error = %e, "Failed to deploy model");
            db.set_deployment(agent.id, None, DEPLOYMENT_FAILED).await?;
            return Err(e.into());
        }
    }

    let agent = db
        .get_agent(agent.id)
        .await?
        .ok_or(AppError::AgentNotFound(agent.id))?;

    info!(agent_id = agent.id, resource_group = %rg_name, "Agent provisioned");

    Ok(ProvisionOutcome {
        message: format!(
            "Provisioned resource group {} and deployed OpenAI model {}.",
            rg_name, deployment.name
        ),
        agent,
    })
}

async fn provision_resources(
    db: &GovernanceDb,
    provisioner: &dyn Provisioner,
    spec: &AgentSpec,
    agent: &Agent,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let plan = BudgetPlan::monthly(
        budget_name(&agent.name),
        spec.budget,
        spec.owner_email.clone(),
        now,
    );
    provisioner.create_budget(&agent.name, &plan).await?;

    let workspace = provisioner
        .create_workspace(
            &agent.name,
            &WorkspacePlan {
                name: project_name(agent.id),
                location: spec.location.clone(),
                display_name: spec.display_name.clone(),
                description: spec.description.clone(),
            },
        )
        .await?;

    let account = provisioner
        .create_openai_account(&agent.name, &openai_account_name(agent.id), &spec.location)
        .await?;

    db.update_agent_provisioning(
        agent.id,
        workspace.as_deref(),
        account.endpoint.as_deref(),
        account.api_key.as_deref(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{CloudError, CurrentSpend, LocalProvisioner, OpenAiAccount};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Step {
        Budget,
        Workspace,
        Deploy,
    }

    /// Records calls and fails at a chosen step
    #[derive(Default)]
    struct ScriptedProvisioner {
        fail_at: Option<Step>,
        resource_group_delay: Option<Duration>,
        budgets: Mutex<Vec<BudgetPlan>>,
        deployments: Mutex<Vec<String>>,
    }

    impl ScriptedProvisioner {
        fn failing_at(step: Step) -> Self {
            Self {
                fail_at: Some(step),
                ..Default::default()
            }
        }

        fn check(&self, step: Step) -> Result<(), CloudError> {
            if self.fail_at == Some(step) {
                Err(CloudError::OperationFailed(format!("{:?} failed", step)))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl Provisioner for ScriptedProvisioner {
        async fn create_resource_group(&self, _: &str, _: &str) -> Result<(), CloudError> {
            if let Some(delay) = self.resource_group_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(())
        }

        async fn delete_resource_group(&self, _: &str) -> Result<(), CloudError> {
            Ok(())
        }

        async fn create_budget(&self, _: &str, plan: &BudgetPlan) -> Result<(), CloudError> {
            self.check(Step::Budget)?;
            self.budgets.lock().unwrap().push(plan.clone());
            Ok(())
        }

        async fn current_spend(
            &self,
            _: &str,
            _: &str,
        ) -> Result<Option<CurrentSpend>, CloudError> {
            Ok(None)
        }

        async fn create_workspace(
            &self,
            _: &str,
            plan: &WorkspacePlan,
        ) -> Result<Option<String>, CloudError> {
            self.check(Step::Workspace)?;
            Ok(Some(format!("https://discovery/{}", plan.name)))
        }

        async fn create_openai_account(
            &self,
            _: &str,
            account_name: &str,
            _: &str,
        ) -> Result<OpenAiAccount, CloudError> {
            Ok(OpenAiAccount {
                endpoint: Some(format!("https://{}.openai.azure.com/", account_name)),
                api_key: Some("key-1".to_string()),
            })
        }

        async fn deploy_model(
            &self,
            _: &str,
            _: &str,
            deployment: &ModelDeployment,
        ) -> Result<(), CloudError> {
            self.check(Step::Deploy)?;
            self.deployments
                .lock()
                .unwrap()
                .push(deployment.name.clone());
            Ok(())
        }
    }

    async fn create_test_db() -> (GovernanceDb, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = GovernanceDb::new(db_path.to_str().unwrap()).await.unwrap();
        (db, temp_dir)
    }

    fn spec(name: &str) -> AgentSpec {
        AgentSpec {
            name: name.to_string(),
            display_name: name.to_string(),
            description: "Answers questions".to_string(),
            owner: "John Doe".to_string(),
            owner_email: "john@example.com".to_string(),
            model_base: "GPT 3.5".to_string(),
            location: "uksouth".to_string(),
            budget: 30.0,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 20, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_resource_names() {
        assert_eq!(resource_group_name(" faq "), "agent-faq-rg");
        assert_eq!(budget_name("agent-faq-rg"), "agent-faq-rg-budget");
        assert_eq!(project_name(7), "project-agent7");
        assert_eq!(openai_account_name(7), "agent7openai");
        assert_eq!(deployment_name(7), "gpt-3-deployment-agent7");
    }

    #[tokio::test]
    async fn test_provision_agent_success() {
        let (db, _temp_dir) = create_test_db().await;
        let provisioner = ScriptedProvisioner::default();

        let outcome = provision_agent(
            &db,
            &provisioner,
            &OpenAiConfig::default(),
            &spec("faq"),
            now(),
        )
        .await
        .unwrap();

        let agent = outcome.agent;
        assert_eq!(agent.name, "agent-faq-rg");
        assert_eq!(agent.display_name, "faq");
        assert!(!agent.active);
        assert_eq!(agent.status, "Waiting for approval");
        assert_eq!(agent.deployment_status.as_deref(), Some("Deployed"));
        assert_eq!(
            agent.deployment_name,
            Some(deployment_name(agent.id))
        );
        assert_eq!(
            agent.workspace,
            Some(format!("https://discovery/project-agent{}", agent.id))
        );
        assert_eq!(agent.openai_api_key.as_deref(), Some("key-1"));
        assert_eq!(
            outcome.message,
            format!(
                "Provisioned resource group agent-faq-rg and deployed OpenAI model gpt-3-deployment-agent{}.",
                agent.id
            )
        );

        let budgets = provisioner.budgets.lock().unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].name, "agent-faq-rg-budget");
        assert_eq!(budgets[0].amount, 30.0);
        assert_eq!(budgets[0].contact_email, "john@example.com");
    }

    #[tokio::test]
    async fn test_provision_agent_rejects_blank_name() {
        let (db, _temp_dir) = create_test_db().await;
        let result = provision_agent(
            &db,
            &LocalProvisioner::new(),
            &OpenAiConfig::default(),
            &spec("   "),
            now(),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_provision_agent_duplicate() {
        let (db, _temp_dir) = create_test_db().await;
        let provisioner = LocalProvisioner::new();
        let openai = OpenAiConfig::default();

        provision_agent(&db, &provisioner, &openai, &spec("faq"), now())
            .await
            .unwrap();
        let result = provision_agent(&db, &provisioner, &openai, &spec("faq"), now()).await;

        match result {
            Err(AppError::AgentExists(name)) => assert_eq!(name, "agent-faq-rg"),
            other => panic!("Expected AgentExists, got: {:?}", other.map(|o| o.agent.id)),
        }
        assert_eq!(db.list_agents().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_before_deployment_removes_agent() {
        for step in [Step::Budget, Step::Workspace] {
            let (db, _temp_dir) = create_test_db().await;
            let provisioner = ScriptedProvisioner::failing_at(step);

            let result = provision_agent(
                &db,
                &provisioner,
                &OpenAiConfig::default(),
                &spec("faq"),
                now(),
            )
            .await;

            assert!(matches!(result, Err(AppError::Cloud(_))), "step {:?}", step);
            assert!(db.list_agents().await.unwrap().is_empty(), "step {:?}", step);
        }
    }

    #[tokio::test]
    async fn test_failed_deployment_is_recorded() {
        let (db, _temp_dir) = create_test_db().await;
        let provisioner = ScriptedProvisioner::failing_at(Step::Deploy);

        let result = provision_agent(
            &db,
            &provisioner,
            &OpenAiConfig::default(),
            &spec("faq"),
            now(),
        )
        .await;
        assert!(matches!(result, Err(AppError::Cloud(_))));

        let agents = db.list_agents().await.unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].deployment_status.as_deref(), Some("Failed"));
        assert!(agents[0].deployment_name.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_creates_register_one_agent() {
        let (db, _temp_dir) = create_test_db().await;
        let provisioner = ScriptedProvisioner {
            resource_group_delay: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let openai = OpenAiConfig::default();
        let faq = spec("faq");

        let (first, second) = tokio::join!(
            provision_agent(&db, &provisioner, &openai, &faq, now()),
            provision_agent(&db, &provisioner, &openai, &faq, now()),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(AppError::AgentExists(name)) if name == "agent-faq-rg")));

        let agents = db.list_agents().await.unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].deployment_status.as_deref(), Some("Deployed"));
        assert_eq!(provisioner.deployments.lock().unwrap().len(), 1);
    }
}
