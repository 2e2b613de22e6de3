// Background request worker
// Each request runs on its own thread and reports back through a channel
// that the UI drains once per frame.

use super::client::{ApiClient, ApiError};
use super::models::{Agent, AgentDetail, KnowledgeSource, NewAgentRequest, NewKnowledgeSource};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

/// Completed request, delivered to the UI thread
#[derive(Debug)]
pub enum ApiEvent {
    /// Result of GET /get_agents
    AgentsLoaded(Result<Vec<Agent>, ApiError>),
    /// Result of GET /get_agent/:id
    AgentLoaded {
        id: i64,
        result: Result<AgentDetail, ApiError>,
    },
    /// Result of POST /new_agent
    AgentCreated(Result<String, ApiError>),
    /// Result of DELETE /delete_agent
    AgentDeleted {
        id: i64,
        result: Result<String, ApiError>,
    },
    /// Result of listing an agent's knowledge sources
    KnowledgeSourcesLoaded {
        agent_id: i64,
        result: Result<Vec<KnowledgeSource>, ApiError>,
    },
    /// Result of attaching a knowledge source
    KnowledgeSourceAdded {
        agent_id: i64,
        result: Result<KnowledgeSource, ApiError>,
    },
    /// Result of POST /chat_completion
    ChatReply {
        agent_id: i64,
        /// Page visit the message was sent from
        visit: u64,
        result: Result<String, ApiError>,
    },
    /// The request never started because its thread could not be spawned
    DispatchFailed {
        request: &'static str,
        error: String,
    },
}

/// Request name used for chat messages
pub const CHAT_REQUEST: &str = "chat_completion";

/// Fire-and-forget request dispatcher
pub struct ApiWorker {
    client: ApiClient,
    event_tx: Sender<ApiEvent>,
    event_rx: Receiver<ApiEvent>,
    /// Invoked after an event is queued, used to wake the UI
    waker: Arc<dyn Fn() + Send + Sync>,
}

impl ApiWorker {
    pub fn new(client: ApiClient) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            client,
            event_tx,
            event_rx,
            waker: Arc::new(|| {}),
        }
    }

    /// Wake the UI whenever a request completes
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Arc::new(waker);
        self
    }

    /// Drain every event that has arrived since the last frame
    pub fn drain_events(&self) -> Vec<ApiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn spawn<F>(&self, name: &'static str, job: F)
    where
        F: FnOnce(&ApiClient) -> ApiEvent + Send + 'static,
    {
        let client = self.client.clone();
        let event_tx = self.event_tx.clone();
        let waker = self.waker.clone();

        let spawned = thread::Builder::new()
            .name(format!("api-{}", name))
            .spawn(move || {
                let event = job(&client);
                // Receiver is gone only when the app is shutting down
                if event_tx.send(event).is_ok() {
                    waker();
                }
            });

        match spawned {
            Ok(_) => tracing::debug!(request = name, "Request dispatched"),
            Err(e) => self.report_dispatch_failure(name, e),
        }
    }

    /// Answer a request that could not start, so the UI stops waiting for it
    fn report_dispatch_failure(&self, name: &'static str, error: std::io::Error) {
        tracing::error!(request = name, error = %error, "Failed to spawn request thread");
        let event = ApiEvent::DispatchFailed {
            request: name,
            error: error.to_string(),
        };
        if self.event_tx.send(event).is_ok() {
            (self.waker)();
        }
    }

    pub fn fetch_agents(&self) {
        self.spawn("get_agents", |client| {
            ApiEvent::AgentsLoaded(client.get_agents())
        });
    }

    pub fn fetch_agent(&self, id: i64) {
        self.spawn("get_agent", move |client| ApiEvent::AgentLoaded {
            id,
            result: client.get_agent(id),
        });
    }

    pub fn create_agent(&self, request: NewAgentRequest) {
        self.spawn("new_agent", move |client| {
            ApiEvent::AgentCreated(client.create_agent(&request).map(|r| r.message))
        });
    }

    pub fn delete_agent(&self, id: i64) {
        self.spawn("delete_agent", move |client| ApiEvent::AgentDeleted {
            id,
            result: client.delete_agent(id).map(|r| r.message),
        });
    }

    pub fn fetch_knowledge_sources(&self, agent_id: i64) {
        self.spawn("knowledge_sources", move |client| {
            ApiEvent::KnowledgeSourcesLoaded {
                agent_id,
                result: client.list_knowledge_sources(agent_id),
            }
        });
    }

    pub fn add_knowledge_source(&self, agent_id: i64, source: NewKnowledgeSource) {
        self.spawn("add_knowledge_source", move |client| {
            ApiEvent::KnowledgeSourceAdded {
                agent_id,
                result: client.add_knowledge_source(agent_id, &source),
            }
        });
    }

    pub fn send_chat(&self, agent_id: i64, visit: u64, user_input: String) {
        self.spawn(CHAT_REQUEST, move |client| ApiEvent::ChatReply {
            agent_id,
            visit,
            result: client.chat(agent_id, &user_input),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuiConfig;
    use mockito::Server;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::{Duration, Instant};

    fn wait_for_event(worker: &ApiWorker) -> ApiEvent {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(event) = worker.drain_events().into_iter().next() {
                return event;
            }
            assert!(Instant::now() < deadline, "no event received");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_fetch_agents_reports_back() {
        let mut server = Server::new();
        server
            .mock("GET", "/get_agents")
            .with_status(200)
            .with_body("[]")
            .create();

        let client = ApiClient::new(&GuiConfig {
            api_url: server.url(),
            request_timeout_secs: 5,
        })
        .unwrap();
        let woken = Arc::new(AtomicBool::new(false));
        let flag = woken.clone();
        let worker = ApiWorker::new(client).with_waker(move || flag.store(true, Ordering::SeqCst));

        worker.fetch_agents();
        match wait_for_event(&worker) {
            ApiEvent::AgentsLoaded(Ok(agents)) => assert!(agents.is_empty()),
            other => panic!("unexpected event: {:?}", other),
        }
        // The waker runs right after the send
        let deadline = Instant::now() + Duration::from_secs(5);
        while !woken.load(Ordering::SeqCst) {
            assert!(Instant::now() < deadline, "waker not invoked");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_unreachable_backend_reports_error() {
        // Port 9 (discard) is not expected to host the backend
        let client = ApiClient::new(&GuiConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
        })
        .unwrap();
        let worker = ApiWorker::new(client);

        worker.fetch_agent(1);
        match wait_for_event(&worker) {
            ApiEvent::AgentLoaded { id, result } => {
                assert_eq!(id, 1);
                assert!(matches!(result, Err(ApiError::Transport(_))));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_failure_is_reported() {
        let client = ApiClient::new(&GuiConfig::default()).unwrap();
        let woken = Arc::new(AtomicBool::new(false));
        let flag = woken.clone();
        let worker = ApiWorker::new(client).with_waker(move || flag.store(true, Ordering::SeqCst));

        worker.report_dispatch_failure(
            CHAT_REQUEST,
            std::io::Error::new(std::io::ErrorKind::OutOfMemory, "no threads left"),
        );

        match worker.drain_events().as_slice() {
            [ApiEvent::DispatchFailed { request, error }] => {
                assert_eq!(*request, CHAT_REQUEST);
                assert_eq!(error, "no threads left");
            }
            other => panic!("unexpected events: {:?}", other),
        }
        assert!(woken.load(Ordering::SeqCst));
    }
}
