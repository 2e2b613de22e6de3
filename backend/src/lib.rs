//! Copilot Governance Backend Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

/// HTTP request handlers
pub mod api;
/// Azure OpenAI chat completions client
pub mod chat;
/// Cloud control plane: Azure and offline provisioners
pub mod cloud;
/// Configuration management
pub mod config;
/// SQLite agent registry
pub mod db;
/// Error types and HTTP error responses
pub mod error;
/// Route table and request middleware
pub mod router;
/// Business logic spanning the registry and the cloud
pub mod services;
/// Application state management
///
/// Shared database, provisioner and HTTP client handles.
pub mod state;
