// Application state management
// Current page, data fetched for it, modal forms, chat log and the queue of
// backend requests waiting to be dispatched.

use super::charts::{budget_pie, PieSlice};
use super::forms::{AgentCreationForm, KnowledgeSourceForm};
use crate::api::{
    Agent, AgentDetail, ApiEvent, KnowledgeSource, NewAgentRequest, NewKnowledgeSource, CHAT_REQUEST,
};

/// Pages of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    Hub,
    CostManagementHub,
    CostManagementAgent(i64),
    AgentManagementHub,
    AgentManagementAgent(i64),
}

impl Route {
    /// Agent shown by this page, if any
    pub fn agent_id(&self) -> Option<i64> {
        match self {
            Route::CostManagementAgent(id) | Route::AgentManagementAgent(id) => Some(*id),
            _ => None,
        }
    }

    pub fn shows_navbar(&self) -> bool {
        !matches!(self, Route::Home)
    }
}

/// Backend request queued by the UI, dispatched by the app each frame
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchAgents,
    FetchAgent(i64),
    FetchKnowledgeSources(i64),
    CreateAgent(NewAgentRequest),
    DeleteAgent(i64),
    AddKnowledgeSource(i64, NewKnowledgeSource),
    SendChat {
        agent_id: i64,
        /// Replies from an earlier visit of the page are discarded
        visit: u64,
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

/// Chat panel on the agent management page
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub awaiting_reply: bool,
}

/// Single-line feedback shown under the navbar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Main application state
#[derive(Debug, Default)]
pub struct AppState {
    pub route: Route,
    /// Result of the last GET /get_agents
    pub agents: Vec<Agent>,
    /// Detail for the agent page currently shown
    pub detail: Option<AgentDetail>,
    pub knowledge_sources: Vec<KnowledgeSource>,
    pub chat: ChatLog,
    pub creation_form: AgentCreationForm,
    pub knowledge_form: KnowledgeSourceForm,
    /// Delete confirmation is open
    pub confirm_delete: bool,
    pub status: Option<StatusMessage>,
    /// Requests dispatched and not yet answered
    pub in_flight: usize,
    /// Bumped on every navigation
    visit: u64,
    commands: Vec<Command>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch page and queue the fetches the new page needs
    ///
    /// Page data is discarded on navigation, matching the per-view
    /// lifetime of everything the dashboard shows.
    pub fn navigate(&mut self, route: Route) {
        tracing::debug!(?route, "Navigate");
        self.route = route;
        self.visit = self.visit.wrapping_add(1);
        self.detail = None;
        self.knowledge_sources.clear();
        self.chat = ChatLog::default();
        self.confirm_delete = false;
        self.creation_form.open = false;
        self.knowledge_form.open = false;

        match route {
            Route::Home | Route::Hub => {}
            Route::CostManagementHub | Route::AgentManagementHub => {
                self.commands.push(Command::FetchAgents);
            }
            Route::CostManagementAgent(id) => {
                self.commands.push(Command::FetchAgent(id));
            }
            Route::AgentManagementAgent(id) => {
                self.commands.push(Command::FetchAgent(id));
                self.commands.push(Command::FetchKnowledgeSources(id));
            }
        }
    }

    /// Reload whatever the current page shows
    pub fn refresh(&mut self) {
        self.navigate(self.route);
    }

    /// Hand queued commands to the dispatcher
    pub fn take_commands(&mut self) -> Vec<Command> {
        let commands = std::mem::take(&mut self.commands);
        self.in_flight += commands.len();
        commands
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::warn!(error = %text, "Request failed");
        self.status = Some(StatusMessage {
            text,
            is_error: true,
        });
    }

    pub fn submit_agent_form(&mut self) {
        if let Some(request) = self.creation_form.submit() {
            self.set_info(format!("Creating agent {}...", request.name));
            self.commands.push(Command::CreateAgent(request));
        }
    }

    pub fn submit_knowledge_form(&mut self) {
        let Some(agent_id) = self.route.agent_id() else {
            return;
        };
        if let Some(source) = self.knowledge_form.submit() {
            self.commands
                .push(Command::AddKnowledgeSource(agent_id, source));
        }
    }

    /// Queue the chat input for the current agent
    pub fn send_chat(&mut self) {
        let Some(agent_id) = self.route.agent_id() else {
            return;
        };
        let text = self.chat.input.trim().to_string();
        if text.is_empty() || self.chat.awaiting_reply {
            return;
        }

        self.chat.input.clear();
        self.chat.awaiting_reply = true;
        self.chat.messages.push(ChatMessage {
            role: ChatRole::User,
            text: text.clone(),
        });
        self.commands.push(Command::SendChat {
            agent_id,
            visit: self.visit,
            text,
        });
    }

    pub fn delete_current_agent(&mut self) {
        if let Some(id) = self.route.agent_id() {
            self.confirm_delete = false;
            self.commands.push(Command::DeleteAgent(id));
        }
    }

    /// Pie slices for the agent page, spend defaulting to zero
    pub fn budget_slices(&self) -> Option<[PieSlice; 2]> {
        self.detail
            .as_ref()
            .map(|detail| budget_pie(detail.budget, detail.current_spend.amount))
    }

    fn is_current_agent(&self, id: i64) -> bool {
        self.route.agent_id() == Some(id)
    }

    /// Fold a finished request into the state
    ///
    /// Replies for an agent page that is no longer shown are dropped.
    pub fn apply_event(&mut self, event: ApiEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            ApiEvent::AgentsLoaded(Ok(agents)) => {
                self.agents = agents;
            }
            ApiEvent::AgentLoaded { id, result } => {
                if !self.is_current_agent(id) {
                    return;
                }
                match result {
                    Ok(detail) => self.detail = Some(detail),
                    Err(e) => self.set_error(format!("Could not load agent {}: {}", id, e)),
                }
            }
            ApiEvent::AgentCreated(Ok(message)) => {
                self.set_info(message);
                if self.route == Route::AgentManagementHub || self.route == Route::CostManagementHub
                {
                    self.commands.push(Command::FetchAgents);
                }
            }
            ApiEvent::AgentDeleted { id, result } => match result {
                Ok(message) => {
                    self.agents.retain(|agent| agent.id != id);
                    if self.is_current_agent(id) {
                        self.navigate(Route::AgentManagementHub);
                    }
                    self.set_info(message);
                }
                Err(e) => self.set_error(format!("Could not delete agent {}: {}", id, e)),
            },
            ApiEvent::KnowledgeSourcesLoaded { agent_id, result } => {
                if !self.is_current_agent(agent_id) {
                    return;
                }
                match result {
                    Ok(sources) => self.knowledge_sources = sources,
                    Err(e) => self.set_error(format!("Could not load knowledge sources: {}", e)),
                }
            }
            ApiEvent::KnowledgeSourceAdded { agent_id, result } => match result {
                Ok(source) => {
                    self.set_info(format!("Knowledge source {} added", source.name));
                    if self.is_current_agent(agent_id) {
                        self.knowledge_sources.push(source);
                    }
                }
                Err(e) => self.set_error(format!("Could not add knowledge source: {}", e)),
            },
            ApiEvent::ChatReply {
                agent_id,
                visit,
                result,
            } => {
                if !self.is_current_agent(agent_id) || visit != self.visit {
                    return;
                }
                self.chat.awaiting_reply = false;
                match result {
                    Ok(reply) => self.chat.messages.push(ChatMessage {
                        role: ChatRole::Assistant,
                        text: reply,
                    }),
                    Err(e) => self.set_error(format!("Chat failed: {}", e)),
                }
            }
            ApiEvent::AgentsLoaded(Err(e)) => {
                self.set_error(format!("Could not load agents: {}", e));
            }
            ApiEvent::AgentCreated(Err(e)) => {
                self.set_error(format!("Could not create agent: {}", e));
            }
            ApiEvent::DispatchFailed { request, error } => {
                if request == CHAT_REQUEST {
                    self.chat.awaiting_reply = false;
                }
                self.set_error(format!("Could not start {} request: {}", request, error));
            }
        }
    }
}
