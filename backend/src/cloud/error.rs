//! Provisioning-specific error types
//!
//! Errors raised while talking to the cloud control plane.

use thiserror::Error;

/// Errors that can occur while provisioning agent resources
#[derive(Error, Debug)]
pub enum CloudError {
    /// The HTTP request could not be sent or its body not read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The control plane answered with a non-success status
    #[error("Azure returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// The response body did not have the expected shape
    #[error("Invalid response from Azure: {0}")]
    InvalidResponse(String),

    /// A long-running operation finished in a failed state
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// A long-running operation did not finish in time
    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    /// Required settings (subscription, token) are missing
    #[error("Provisioner not configured: {0}")]
    NotConfigured(String),
}
