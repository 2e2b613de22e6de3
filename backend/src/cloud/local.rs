//! Offline provisioner
//!
//! Accepts every request without touching a cloud. Agents created through it
//! have no OpenAI endpoint, so chat reports the deployment as unavailable.

use crate::cloud::{
    BudgetPlan, CloudError, CurrentSpend, ModelDeployment, OpenAiAccount, Provisioner,
    WorkspacePlan,
};
use async_trait::async_trait;
use tracing::info;

/// Provisioner that only logs what it would do
#[derive(Debug, Default, Clone)]
pub struct LocalProvisioner;

impl LocalProvisioner {
    /// Create a local provisioner
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Provisioner for LocalProvisioner {
    async fn create_resource_group(&self, name: &str, location: &str) -> Result<(), CloudError> {
        info!(resource_group = name, location, "Local provisioner: resource group");
        Ok(())
    }

    async fn delete_resource_group(&self, name: &str) -> Result<(), CloudError> {
        info!(resource_group = name, "Local provisioner: delete resource group");
        Ok(())
    }

    async fn create_budget(
        &self,
        resource_group: &str,
        plan: &BudgetPlan,
    ) -> Result<(), CloudError> {
        info!(
            resource_group,
            budget = %plan.name,
            amount = plan.amount,
            "Local provisioner: budget"
        );
        Ok(())
    }

    async fn current_spend(
        &self,
        _resource_group: &str,
        _budget_name: &str,
    ) -> Result<Option<CurrentSpend>, CloudError> {
        Ok(None)
    }

    async fn create_workspace(
        &self,
        resource_group: &str,
        plan: &WorkspacePlan,
    ) -> Result<Option<String>, CloudError> {
        info!(resource_group, workspace = %plan.name, "Local provisioner: workspace");
        Ok(None)
    }

    async fn create_openai_account(
        &self,
        resource_group: &str,
        account_name: &str,
        _location: &str,
    ) -> Result<OpenAiAccount, CloudError> {
        info!(resource_group, account = account_name, "Local provisioner: OpenAI account");
        Ok(OpenAiAccount::default())
    }

    async fn deploy_model(
        &self,
        resource_group: &str,
        account_name: &str,
        deployment: &ModelDeployment,
    ) -> Result<(), CloudError> {
        info!(
            resource_group,
            account = account_name,
            deployment = %deployment.name,
            model = %deployment.model,
            "Local provisioner: model deployment"
        );
        Ok(())
    }
}
