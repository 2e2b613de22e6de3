// Copilot Governance - Main Entry Point
// Native dashboard over the governance backend's HTTP API

mod api;
mod config;
mod state;
mod ui;

use api::{ApiClient, ApiWorker};
use config::GuiConfig;
use eframe::egui;
use state::{AppState, Command, Route};
use ui::render_app_layout;

fn main() -> eframe::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = GuiConfig::from_env();
    tracing::info!(api_url = %config.api_url, "Starting dashboard");

    let client = match ApiClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Copilot Governance")
            .with_inner_size([1100.0, 780.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Copilot Governance",
        options,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            let worker = ApiWorker::new(client).with_waker(move || ctx.request_repaint());
            Box::new(GovernanceApp::new(worker))
        }),
    )
}

/// Main application struct
/// Owns the page state and dispatches its queued requests
struct GovernanceApp {
    state: AppState,
    worker: ApiWorker,
}

impl GovernanceApp {
    fn new(worker: ApiWorker) -> Self {
        Self {
            state: AppState::new(),
            worker,
        }
    }

    /// Apply finished requests, then start the ones queued since last frame
    fn sync(&mut self) {
        for event in self.worker.drain_events() {
            self.state.apply_event(event);
        }

        for command in self.state.take_commands() {
            match command {
                Command::FetchAgents => self.worker.fetch_agents(),
                Command::FetchAgent(id) => self.worker.fetch_agent(id),
                Command::FetchKnowledgeSources(id) => self.worker.fetch_knowledge_sources(id),
                Command::CreateAgent(request) => self.worker.create_agent(request),
                Command::DeleteAgent(id) => self.worker.delete_agent(id),
                Command::AddKnowledgeSource(id, source) => {
                    self.worker.add_knowledge_source(id, source)
                }
                Command::SendChat {
                    agent_id,
                    visit,
                    text,
                } => self.worker.send_chat(agent_id, visit, text),
            }
        }
    }
}

impl eframe::App for GovernanceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync();
        render_app_layout(ctx, &mut self.state);
        // Commands queued by this frame's clicks go out immediately
        self.sync();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_app() -> GovernanceApp {
        let client = ApiClient::new(&GuiConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 1,
        })
        .unwrap();
        GovernanceApp::new(ApiWorker::new(client))
    }

    #[test]
    fn test_app_starts_on_home() {
        let app = offline_app();
        assert_eq!(app.state.route, Route::Home);
        assert_eq!(app.state.in_flight, 0);
    }

    #[test]
    fn test_sync_dispatches_queued_commands() {
        let mut app = offline_app();
        app.state.navigate(Route::AgentManagementAgent(1));
        app.sync();
        assert_eq!(app.state.in_flight, 2);
        assert!(app.state.take_commands().is_empty());
    }
}
