// State management module
// Page routing, fetched data, forms and chart inputs

pub mod app_state;
pub mod charts;
pub mod forms;

pub use app_state::{AppState, ChatRole, Command, Route};
