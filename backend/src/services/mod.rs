//! Service layer for business logic
//!
//! This module contains service abstractions that separate business logic
//! from HTTP handlers, making the code more modular and testable.

pub mod provisioning;

pub use provisioning::{provision_agent, AgentSpec, ProvisionOutcome};
