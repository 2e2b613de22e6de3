// Blocking HTTP client for the governance backend
// Called from worker threads only; never from the UI thread

use super::models::{
    Agent, AgentDetail, ChatRequest, ChatResponse, ErrorBody, KnowledgeSource, MessageResponse,
    NewAgentRequest, NewKnowledgeSource,
};
use crate::config::GuiConfig;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors surfaced to the status line
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, timeout or decoding failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },
}

/// Thin wrapper over the backend's REST endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &GuiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode a JSON success body
    ///
    /// Non-2xx responses are mapped to `ApiError::Status`, using the
    /// backend's `error` field when the body carries one.
    fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json()?);
        }

        let body = response.text().unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unexpected response")
                        .to_string()
                } else {
                    body
                }
            });
        tracing::warn!(status = status.as_u16(), %message, "Backend request failed");

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    pub fn get_agents(&self) -> Result<Vec<Agent>, ApiError> {
        self.execute(self.http.get(self.url("/get_agents")))
    }

    pub fn get_agent(&self, id: i64) -> Result<AgentDetail, ApiError> {
        self.execute(self.http.get(self.url(&format!("/get_agent/{}", id))))
    }

    pub fn create_agent(&self, request: &NewAgentRequest) -> Result<MessageResponse, ApiError> {
        self.execute(self.http.post(self.url("/new_agent")).json(request))
    }

    pub fn delete_agent(&self, id: i64) -> Result<MessageResponse, ApiError> {
        self.execute(
            self.http
                .delete(self.url("/delete_agent"))
                .query(&[("id", id)]),
        )
    }

    pub fn list_knowledge_sources(&self, agent_id: i64) -> Result<Vec<KnowledgeSource>, ApiError> {
        self.execute(
            self.http
                .get(self.url(&format!("/agents/{}/knowledge_sources", agent_id))),
        )
    }

    pub fn add_knowledge_source(
        &self,
        agent_id: i64,
        source: &NewKnowledgeSource,
    ) -> Result<KnowledgeSource, ApiError> {
        self.execute(
            self.http
                .post(self.url(&format!("/agents/{}/knowledge_sources", agent_id)))
                .json(source),
        )
    }

    /// Returns the assistant's reply
    pub fn chat(&self, agent_id: i64, user_input: &str) -> Result<String, ApiError> {
        let response: ChatResponse = self.execute(
            self.http
                .post(self.url("/chat_completion"))
                .json(&ChatRequest {
                    agent_id,
                    user_input,
                }),
        )?;
        Ok(response.assistant_reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server) -> ApiClient {
        ApiClient::new(&GuiConfig {
            api_url: server.url(),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_get_agents() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/get_agents")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"id":1,"name":"agent-faq-rg","display_name":"faq","owner":"John Doe",
                    "status":"Waiting for approval","active":false,"budget":10.0}]"#,
            )
            .create();

        let agents = client_for(&server).get_agents().unwrap();
        mock.assert();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].owner, "John Doe");
        assert!(!agents[0].active);
    }

    #[test]
    fn test_error_body_is_surfaced() {
        let mut server = Server::new();
        server
            .mock("GET", "/get_agent/9")
            .with_status(404)
            .with_body(r#"{"error":"Agent not found: 9","status":404}"#)
            .create();

        let err = client_for(&server).get_agent(9).unwrap_err();
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Agent not found: 9");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_plain_error_body() {
        let mut server = Server::new();
        server
            .mock("GET", "/get_agents")
            .with_status(503)
            .create();

        let err = client_for(&server).get_agents().unwrap_err();
        assert_eq!(err.to_string(), "Service Unavailable (HTTP 503)");
    }

    #[test]
    fn test_delete_sends_id_query() {
        let mut server = Server::new();
        let mock = server
            .mock("DELETE", "/delete_agent")
            .match_query(Matcher::UrlEncoded("id".into(), "3".into()))
            .with_status(200)
            .with_body(r#"{"message":"Record with ID 3 has been deleted.","status":"ok"}"#)
            .create();

        let reply = client_for(&server).delete_agent(3).unwrap();
        mock.assert();
        assert_eq!(reply.message, "Record with ID 3 has been deleted.");
    }

    #[test]
    fn test_chat_posts_agent_and_input() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/chat_completion")
            .match_body(Matcher::Json(serde_json::json!({
                "agent_id": 2,
                "user_input": "What is the capital of France?"
            })))
            .with_status(200)
            .with_body(r#"{"assistant_reply":"Paris."}"#)
            .create();

        let reply = client_for(&server)
            .chat(2, "What is the capital of France?")
            .unwrap();
        mock.assert();
        assert_eq!(reply, "Paris.");
    }

    #[test]
    fn test_create_agent_posts_form() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/new_agent")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "name": "faq",
                "location": "uksouth",
                "budget": 1.0
            })))
            .with_status(201)
            .with_body(r#"{"message":"Provisioned resource group agent-faq-rg","status":"ok"}"#)
            .create();

        let request = NewAgentRequest {
            name: "faq".to_string(),
            description: String::new(),
            owner: "John Doe".to_string(),
            owner_email: "john@example.com".to_string(),
            model_base: "GPT 3.5".to_string(),
            location: "uksouth".to_string(),
            budget: 1.0,
        };
        let reply = client_for(&server).create_agent(&request).unwrap();
        mock.assert();
        assert!(reply.message.contains("agent-faq-rg"));
    }
}
