//! Database module
//!
//! Stores the agent registry and knowledge sources in SQLite.

pub mod governance_db;
pub mod models;

pub use governance_db::GovernanceDb;
pub use models::{Agent, AgentKnowledgeSource, KnowledgeSource, NewAgent};
