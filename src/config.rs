// Dashboard configuration
// Read from the environment (a .env file is loaded first in main)

use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for talking to the governance backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiConfig {
    /// Base URL of the backend, without trailing slash
    pub api_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GuiConfig {
    /// Load from COPILOT_API_URL and COPILOT_REQUEST_TIMEOUT_SECS
    pub fn from_env() -> Self {
        let api_url = env::var("COPILOT_API_URL")
            .ok()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let request_timeout_secs = env::var("COPILOT_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .filter(|t| *t > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_url,
            request_timeout_secs,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
