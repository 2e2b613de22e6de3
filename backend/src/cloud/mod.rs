//! Cloud provisioning module
//!
//! Every agent owns a resource group holding its budget, AI project and
//! OpenAI account. The `Provisioner` trait abstracts the control plane so the
//! server can run against Azure or entirely offline.

pub mod azure;
pub mod error;
pub mod local;
pub mod types;

pub use azure::AzureProvisioner;
pub use error::CloudError;
pub use local::LocalProvisioner;
pub use types::{BudgetPlan, CurrentSpend, ModelDeployment, OpenAiAccount, WorkspacePlan};

use crate::config::{CloudConfig, ProvisionerKind};
use async_trait::async_trait;
use std::sync::Arc;

/// Control-plane operations needed to manage an agent's resources
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Create (or update) a resource group tagged as an agent group
    async fn create_resource_group(&self, name: &str, location: &str) -> Result<(), CloudError>;

    /// Start deleting a resource group and everything in it
    async fn delete_resource_group(&self, name: &str) -> Result<(), CloudError>;

    /// Create (or update) a cost budget scoped to the resource group
    async fn create_budget(&self, resource_group: &str, plan: &BudgetPlan)
        -> Result<(), CloudError>;

    /// Read the current spend recorded against a budget
    async fn current_spend(
        &self,
        resource_group: &str,
        budget_name: &str,
    ) -> Result<Option<CurrentSpend>, CloudError>;

    /// Create the AI project workspace, returning its discovery URL
    async fn create_workspace(
        &self,
        resource_group: &str,
        plan: &WorkspacePlan,
    ) -> Result<Option<String>, CloudError>;

    /// Create an OpenAI account and fetch its endpoint and primary key
    async fn create_openai_account(
        &self,
        resource_group: &str,
        account_name: &str,
        location: &str,
    ) -> Result<OpenAiAccount, CloudError>;

    /// Deploy a model into an OpenAI account
    async fn deploy_model(
        &self,
        resource_group: &str,
        account_name: &str,
        deployment: &ModelDeployment,
    ) -> Result<(), CloudError>;
}

/// Build the provisioner selected by configuration
pub fn provisioner_from_config(
    client: reqwest::Client,
    config: &CloudConfig,
) -> Result<Arc<dyn Provisioner>, CloudError> {
    match config.provisioner {
        ProvisionerKind::Azure => Ok(Arc::new(AzureProvisioner::new(client, config)?)),
        ProvisionerKind::Local => Ok(Arc::new(LocalProvisioner::new())),
    }
}
