//! Azure Resource Manager provisioner
//!
//! Direct REST calls against the Resource Manager endpoints for resource
//! groups, consumption budgets, machine-learning workspaces and Cognitive
//! Services (OpenAI) accounts.

use crate::cloud::{
    BudgetPlan, CloudError, CurrentSpend, ModelDeployment, OpenAiAccount, Provisioner,
    WorkspacePlan,
};
use crate::config::CloudConfig;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::Instant;

const RESOURCES_API_VERSION: &str = "2021-04-01";
const CONSUMPTION_API_VERSION: &str = "2023-05-01";
const COGNITIVE_API_VERSION: &str = "2023-05-01";
const MACHINE_LEARNING_API_VERSION: &str = "2024-04-01";
const STORAGE_API_VERSION: &str = "2023-01-01";
const KEY_VAULT_API_VERSION: &str = "2023-07-01";
const SUBSCRIPTIONS_API_VERSION: &str = "2022-12-01";

struct ArmResponse {
    status: StatusCode,
    operation_url: Option<String>,
    location_url: Option<String>,
    body: Value,
}

/// Provisioner backed by Azure Resource Manager
pub struct AzureProvisioner {
    client: reqwest::Client,
    base_url: String,
    subscription_id: String,
    access_token: String,
    poll_interval: Duration,
    operation_timeout: Duration,
}

impl AzureProvisioner {
    /// Create a provisioner from cloud configuration
    ///
    /// # Errors
    /// * `CloudError::NotConfigured` if the subscription or access token is missing
    pub fn new(client: reqwest::Client, config: &CloudConfig) -> Result<Self, CloudError> {
        let subscription_id = config
            .subscription_id
            .clone()
            .ok_or_else(|| CloudError::NotConfigured("AZURE_SUBSCRIPTION_ID is not set".into()))?;
        let access_token = config
            .access_token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| CloudError::NotConfigured("AZURE_ACCESS_TOKEN is not set".into()))?;

        Ok(Self {
            client,
            base_url: config.management_url.trim_end_matches('/').to_string(),
            subscription_id,
            access_token,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            operation_timeout: Duration::from_secs(config.operation_timeout_secs),
        })
    }

    fn resource_group_url(&self, name: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourcegroups/{}",
            self.base_url, self.subscription_id, name
        )
    }

    /// ARM resource ID, as referenced from other resources' properties
    fn resource_id(&self, resource_group: &str, provider_path: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/{}",
            self.subscription_id, resource_group, provider_path
        )
    }

    fn provider_url(&self, resource_group: &str, provider_path: &str) -> String {
        format!(
            "{}{}",
            self.base_url,
            self.resource_id(resource_group, provider_path)
        )
    }

    /// Directory tenant of the subscription, needed for key vault access
    async fn tenant_id(&self) -> Result<String, CloudError> {
        let url = format!("{}/subscriptions/{}", self.base_url, self.subscription_id);
        let response = self
            .send(Method::GET, &url, Some(SUBSCRIPTIONS_API_VERSION), None)
            .await?;
        response
            .body
            .get("tenantId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CloudError::InvalidResponse("subscription has no tenantId".into()))
    }

    /// Storage account backing a workspace, returning its resource ID
    async fn create_storage_account(
        &self,
        resource_group: &str,
        name: &str,
        location: &str,
    ) -> Result<String, CloudError> {
        let path = format!("Microsoft.Storage/storageAccounts/{}", name);
        let body = json!({
            "location": location,
            "kind": "StorageV2",
            "sku": { "name": "Standard_LRS" },
            "properties": {
                "minimumTlsVersion": "TLS1_2",
                "allowBlobPublicAccess": false,
            }
        });
        self.put_and_wait(
            &self.provider_url(resource_group, &path),
            STORAGE_API_VERSION,
            &body,
        )
        .await?;
        tracing::debug!(storage_account = name, "Created storage account");
        Ok(self.resource_id(resource_group, &path))
    }

    /// Key vault backing a workspace, returning its resource ID
    async fn create_key_vault(
        &self,
        resource_group: &str,
        name: &str,
        location: &str,
    ) -> Result<String, CloudError> {
        let tenant_id = self.tenant_id().await?;
        let path = format!("Microsoft.KeyVault/vaults/{}", name);
        let body = json!({
            "location": location,
            "properties": {
                "tenantId": tenant_id,
                "sku": { "family": "A", "name": "standard" },
                "enableRbacAuthorization": true,
                "accessPolicies": [],
            }
        });
        self.put_and_wait(
            &self.provider_url(resource_group, &path),
            KEY_VAULT_API_VERSION,
            &body,
        )
        .await?;
        tracing::debug!(key_vault = name, "Created key vault");
        Ok(self.resource_id(resource_group, &path))
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        api_version: Option<&str>,
        body: Option<&Value>,
    ) -> Result<ArmResponse, CloudError> {
        let mut request = self
            .client
            .request(method.clone(), url)
            .bearer_auth(&self.access_token);
        if let Some(version) = api_version {
            request = request.query(&[("api-version", version)]);
        }
        request = match body {
            Some(body) => request.json(body),
            None if method == Method::POST => request.body(Vec::new()),
            None => request,
        };

        tracing::debug!(method = %method, url = %url, "Calling Azure Resource Manager");

        let response = request.send().await?;
        let status = response.status();
        let operation_url = header_string(response.headers(), "azure-asyncoperation");
        let location_url = header_string(response.headers(), "location");
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status_code = status.as_u16(),
                error_body = %text,
                "Azure Resource Manager returned error status"
            );
            return Err(CloudError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                CloudError::InvalidResponse(format!("{} - Response body: {}", e, text))
            })?
        };

        Ok(ArmResponse {
            status,
            operation_url,
            location_url,
            body,
        })
    }

    /// PUT a resource and, for asynchronous creations, wait and re-read it
    async fn put_and_wait(
        &self,
        url: &str,
        api_version: &str,
        body: &Value,
    ) -> Result<Value, CloudError> {
        let response = self
            .send(Method::PUT, url, Some(api_version), Some(body))
            .await?;

        if self.wait_for_completion(&response).await? {
            let refreshed = self.send(Method::GET, url, Some(api_version), None).await?;
            Ok(refreshed.body)
        } else {
            Ok(response.body)
        }
    }

    /// Returns `true` when the response described a long-running operation
    async fn wait_for_completion(&self, response: &ArmResponse) -> Result<bool, CloudError> {
        if let Some(operation_url) = &response.operation_url {
            self.poll_async_operation(operation_url).await?;
            return Ok(true);
        }
        if response.status == StatusCode::ACCEPTED {
            if let Some(location_url) = &response.location_url {
                self.poll_location(location_url).await?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn poll_async_operation(&self, url: &str) -> Result<(), CloudError> {
        let deadline = Instant::now() + self.operation_timeout;
        loop {
            let response = self.send(Method::GET, url, None, None).await?;
            let status = response
                .body
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("InProgress");

            match status {
                "Succeeded" => return Ok(()),
                "Failed" | "Canceled" => {
                    let message = response
                        .body
                        .pointer("/error/message")
                        .and_then(Value::as_str)
                        .unwrap_or(status)
                        .to_string();
                    return Err(CloudError::OperationFailed(message));
                }
                _ => {}
            }

            if Instant::now() >= deadline {
                return Err(CloudError::Timeout(self.operation_timeout.as_secs()));
            }
            tracing::debug!(status, "Waiting for Azure operation");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn poll_location(&self, url: &str) -> Result<(), CloudError> {
        let deadline = Instant::now() + self.operation_timeout;
        loop {
            let response = self.send(Method::GET, url, None, None).await?;
            if response.status != StatusCode::ACCEPTED {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(CloudError::Timeout(self.operation_timeout.as_secs()));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Storage account name for a workspace: 3-24 lowercase letters and digits
fn storage_account_name(workspace: &str) -> String {
    let mut name: String = workspace
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(22)
        .collect();
    name.push_str("st");
    name
}

/// Key vault name for a workspace: 3-24 letters, digits and hyphens
fn key_vault_name(workspace: &str) -> String {
    let base: String = workspace
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(21)
        .collect();
    format!("{}-kv", base.trim_end_matches('-'))
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

/// Request body for a consumption budget
fn budget_body(plan: &BudgetPlan) -> Value {
    let mut notifications = serde_json::Map::new();
    notifications.insert(
        crate::cloud::types::BUDGET_NOTIFICATION_NAME.to_string(),
        json!({
            "enabled": true,
            "operator": "GreaterThan",
            "threshold": crate::cloud::types::BUDGET_ALERT_THRESHOLD,
            "contactEmails": [plan.contact_email],
            "thresholdType": "Actual",
        }),
    );

    json!({
        "properties": {
            "category": "Cost",
            "amount": plan.amount,
            "timeGrain": plan.time_grain,
            "timePeriod": {
                "startDate": plan.start_date.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                "endDate": plan.end_date.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            },
            "notifications": notifications,
        }
    })
}

#[async_trait]
impl Provisioner for AzureProvisioner {
    async fn create_resource_group(&self, name: &str, location: &str) -> Result<(), CloudError> {
        let body = json!({ "location": location, "tags": { "type": "agent" } });
        self.send(
            Method::PUT,
            &self.resource_group_url(name),
            Some(RESOURCES_API_VERSION),
            Some(&body),
        )
        .await?;
        tracing::info!(resource_group = name, location, "Provisioned resource group");
        Ok(())
    }

    async fn delete_resource_group(&self, name: &str) -> Result<(), CloudError> {
        self.send(
            Method::DELETE,
            &self.resource_group_url(name),
            Some(RESOURCES_API_VERSION),
            None,
        )
        .await?;
        tracing::info!(resource_group = name, "Started resource group deletion");
        Ok(())
    }

    async fn create_budget(
        &self,
        resource_group: &str,
        plan: &BudgetPlan,
    ) -> Result<(), CloudError> {
        let url = self.provider_url(
            resource_group,
            &format!("Microsoft.Consumption/budgets/{}", plan.name),
        );
        self.send(
            Method::PUT,
            &url,
            Some(CONSUMPTION_API_VERSION),
            Some(&budget_body(plan)),
        )
        .await?;
        tracing::info!(resource_group, budget = %plan.name, amount = plan.amount, "Created budget");
        Ok(())
    }

    async fn current_spend(
        &self,
        resource_group: &str,
        budget_name: &str,
    ) -> Result<Option<CurrentSpend>, CloudError> {
        let url = self.provider_url(
            resource_group,
            &format!("Microsoft.Consumption/budgets/{}", budget_name),
        );
        let response = self
            .send(Method::GET, &url, Some(CONSUMPTION_API_VERSION), None)
            .await?;

        match response.body.pointer("/properties/currentSpend") {
            None | Some(Value::Null) => Ok(None),
            Some(spend) => serde_json::from_value(spend.clone())
                .map(Some)
                .map_err(|e| CloudError::InvalidResponse(format!("currentSpend: {}", e))),
        }
    }

    async fn create_workspace(
        &self,
        resource_group: &str,
        plan: &WorkspacePlan,
    ) -> Result<Option<String>, CloudError> {
        // Workspaces must reference an existing storage account and key vault
        let storage_account = self
            .create_storage_account(
                resource_group,
                &storage_account_name(&plan.name),
                &plan.location,
            )
            .await?;
        let key_vault = self
            .create_key_vault(resource_group, &key_vault_name(&plan.name), &plan.location)
            .await?;

        let url = self.provider_url(
            resource_group,
            &format!("Microsoft.MachineLearningServices/workspaces/{}", plan.name),
        );
        let body = json!({
            "location": plan.location,
            "identity": { "type": "SystemAssigned" },
            "properties": {
                "friendlyName": plan.display_name,
                "description": plan.description,
                "storageAccount": storage_account,
                "keyVault": key_vault,
            }
        });
        let workspace = self
            .put_and_wait(&url, MACHINE_LEARNING_API_VERSION, &body)
            .await?;

        tracing::info!(
            workspace = %plan.name,
            location = %plan.location,
            "Provisioned AI project workspace"
        );

        Ok(workspace
            .pointer("/properties/discoveryUrl")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn create_openai_account(
        &self,
        resource_group: &str,
        account_name: &str,
        location: &str,
    ) -> Result<OpenAiAccount, CloudError> {
        let url = self.provider_url(
            resource_group,
            &format!("Microsoft.CognitiveServices/accounts/{}", account_name),
        );
        let body = json!({
            "location": location,
            "kind": "OpenAI",
            "sku": { "name": "S0" },
            "properties": {},
        });
        let account = self.put_and_wait(&url, COGNITIVE_API_VERSION, &body).await?;
        let endpoint = account
            .pointer("/properties/endpoint")
            .and_then(Value::as_str)
            .map(str::to_string);

        let keys = self
            .send(
                Method::POST,
                &format!("{}/listKeys", url),
                Some(COGNITIVE_API_VERSION),
                None,
            )
            .await?;
        let api_key = keys
            .body
            .get("key1")
            .and_then(Value::as_str)
            .map(str::to_string);

        tracing::info!(account = account_name, has_endpoint = endpoint.is_some(), "Created OpenAI account");

        Ok(OpenAiAccount { endpoint, api_key })
    }

    async fn deploy_model(
        &self,
        resource_group: &str,
        account_name: &str,
        deployment: &ModelDeployment,
    ) -> Result<(), CloudError> {
        let url = self.provider_url(
            resource_group,
            &format!(
                "Microsoft.CognitiveServices/accounts/{}/deployments/{}",
                account_name, deployment.name
            ),
        );
        let body = json!({
            "sku": { "name": deployment.sku_name, "capacity": deployment.capacity },
            "properties": {
                "model": {
                    "format": "OpenAI",
                    "name": deployment.model,
                    "version": deployment.version,
                }
            }
        });
        self.put_and_wait(&url, COGNITIVE_API_VERSION, &body).await?;
        tracing::info!(deployment = %deployment.name, "Deployment completed successfully");
        Ok(())
    }
}
