//! Provisioning request and result types

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Budget alert threshold, in percent of the budget amount
pub const BUDGET_ALERT_THRESHOLD: f64 = 80.0;

/// Name of the single notification attached to agent budgets
pub const BUDGET_NOTIFICATION_NAME: &str = "Actual_GreaterThan_80_Percent";

/// Spend reported against an agent's budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSpend {
    /// Amount spent in the current period
    pub amount: f64,
    /// Currency unit, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl CurrentSpend {
    /// Spend used when the budget reports nothing
    pub fn zero() -> Self {
        Self {
            amount: 0.0,
            unit: None,
        }
    }
}

/// Cost budget created for every agent's resource group
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetPlan {
    /// Budget resource name
    pub name: String,
    /// Amount per period
    pub amount: f64,
    /// Period granularity (`Monthly`)
    pub time_grain: String,
    /// Start of the budget, first day of a month
    pub start_date: DateTime<Utc>,
    /// End of the budget
    pub end_date: DateTime<Utc>,
    /// Recipient of the threshold notification
    pub contact_email: String,
}

impl BudgetPlan {
    /// Monthly budget starting at the beginning of `now`'s month and running one year
    pub fn monthly(name: String, amount: f64, contact_email: String, now: DateTime<Utc>) -> Self {
        let start_date = first_of_month(now.year(), now.month());
        let end_date = first_of_month(now.year() + 1, now.month());
        Self {
            name,
            amount,
            time_grain: "Monthly".to_string(),
            start_date,
            end_date,
            contact_email,
        }
    }
}

fn first_of_month(year: i32, month: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// AI project workspace created for an agent
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspacePlan {
    /// Workspace resource name (`project-agent{id}`)
    pub name: String,
    /// Cloud region
    pub location: String,
    /// Friendly name shown in the portal
    pub display_name: String,
    /// Description
    pub description: String,
}

/// Endpoint and key of a freshly created OpenAI account
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenAiAccount {
    /// Inference endpoint
    pub endpoint: Option<String>,
    /// Primary key
    pub api_key: Option<String>,
}

/// Model deployment inside an OpenAI account
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDeployment {
    /// Deployment name
    pub name: String,
    /// Model name (e.g. `gpt-35-turbo`)
    pub model: String,
    /// Model version
    pub version: String,
    /// SKU name
    pub sku_name: String,
    /// SKU capacity
    pub capacity: u32,
}

impl ModelDeployment {
    /// Standard single-unit deployment of an OpenAI model
    pub fn standard(name: String, model: String, version: String) -> Self {
        Self {
            name,
            model,
            version,
            sku_name: "Standard".to_string(),
            capacity: 1,
        }
    }
}
