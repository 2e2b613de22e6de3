// Backend access
// Blocking client, wire models and the background worker that drives them

pub mod client;
pub mod models;
pub mod worker;

pub use client::ApiClient;
pub use models::{Agent, AgentDetail, KnowledgeSource, NewAgentRequest, NewKnowledgeSource};
pub use worker::{ApiEvent, ApiWorker, CHAT_REQUEST};
