//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Persistence configuration
    pub persistence: PersistenceConfig,
    /// Cloud provisioning configuration
    pub cloud: CloudConfig,
    /// Azure OpenAI configuration
    pub openai: OpenAiConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Path of the SQLite database file
    pub database_path: String,
}

/// Which provisioner backs agent creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionerKind {
    /// Azure Resource Manager over REST
    Azure,
    /// Offline provisioner, nothing leaves the process
    Local,
}

/// Cloud provisioning configuration
#[derive(Clone)]
pub struct CloudConfig {
    /// Selected provisioner
    pub provisioner: ProvisionerKind,
    /// Azure subscription that owns the agent resource groups
    pub subscription_id: Option<String>,
    /// Bearer token for Azure Resource Manager
    pub access_token: Option<String>,
    /// Resource Manager base URL
    pub management_url: String,
    /// Delay between long-running operation polls (in seconds)
    pub poll_interval_secs: u64,
    /// Give up on a long-running operation after this many seconds
    pub operation_timeout_secs: u64,
}

impl std::fmt::Debug for CloudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudConfig")
            .field("provisioner", &self.provisioner)
            .field("subscription_id", &self.subscription_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("management_url", &self.management_url)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("operation_timeout_secs", &self.operation_timeout_secs)
            .finish()
    }
}

/// Azure OpenAI configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API version passed to chat completions
    pub api_version: String,
    /// Model deployed for every new agent
    pub model: String,
    /// Model version deployed for every new agent
    pub model_version: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let subscription_id = env::var("AZURE_SUBSCRIPTION_ID")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let provisioner = match env::var("PROVISIONER").ok().as_deref() {
            Some("azure") => ProvisionerKind::Azure,
            Some("local") => ProvisionerKind::Local,
            _ if subscription_id.is_some() => ProvisionerKind::Azure,
            _ => ProvisionerKind::Local,
        };

        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8000),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_origins: env::var("CORS_ORIGINS")
                    .map(|origins| parse_list(&origins))
                    .unwrap_or_else(|_| {
                        vec![
                            "http://localhost".to_string(),
                            "http://localhost:5173".to_string(),
                        ]
                    }),
            },
            persistence: PersistenceConfig {
                database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| {
                    // Default to ~/.copilot-governance or current directory
                    if let Some(home) = env::var_os("HOME") {
                        format!("{}/.copilot-governance/governance.db", home.to_string_lossy())
                    } else {
                        ".copilot-governance/governance.db".to_string()
                    }
                }),
            },
            cloud: CloudConfig {
                provisioner,
                subscription_id,
                access_token: env::var("AZURE_ACCESS_TOKEN").ok(),
                management_url: env::var("AZURE_MANAGEMENT_URL")
                    .unwrap_or_else(|_| "https://management.azure.com".to_string()),
                poll_interval_secs: env::var("AZURE_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(5),
                operation_timeout_secs: env::var("AZURE_OPERATION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(3600),
            },
            openai: OpenAiConfig {
                api_version: env::var("OPENAI_API_VERSION")
                    .unwrap_or_else(|_| "2024-02-15-preview".to_string()),
                model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-35-turbo".to_string()),
                model_version: env::var("OPENAI_MODEL_VERSION")
                    .unwrap_or_else(|_| "0613".to_string()),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_version: "2024-02-15-preview".to_string(),
            model: "gpt-35-turbo".to_string(),
            model_version: "0613".to_string(),
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
