//! Chat module
//!
//! Proxies single-turn chat completions to each agent's Azure OpenAI deployment.

pub mod openai;
pub mod types;

pub use openai::call_chat_completion;
