//! Integration tests for the governance HTTP API
//!
//! These tests start the real router on an ephemeral port with the local
//! provisioner and a temporary SQLite database, then drive it over HTTP the
//! way the dashboard does.

use copilot_governance_backend::cloud::LocalProvisioner;
use copilot_governance_backend::config::OpenAiConfig;
use copilot_governance_backend::db::GovernanceDb;
use copilot_governance_backend::router::build_router;
use copilot_governance_backend::state::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

/// Start the server and return its base URL
async fn spawn_server() -> (String, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("governance.db");
    let db = GovernanceDb::new(db_path.to_str().unwrap()).await.unwrap();
    let state = AppState::new(
        db,
        Arc::new(LocalProvisioner::new()),
        reqwest::Client::new(),
        OpenAiConfig::default(),
    )
    .shared();
    let app = build_router(state, &["http://localhost:5173".to_string()]);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), temp_dir)
}

fn agent_payload(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Answers customer questions",
        "owner": "John Doe",
        "owner_email": "john@example.com",
        "model_base": "GPT 3.5",
        "location": "uksouth",
        "budget": 20.0
    })
}

#[tokio::test]
async fn test_root_and_health() {
    let (base, _temp_dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let root: Value = client
        .get(format!("{}/", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(root["message"], "Hello World");

    let health: Value = client
        .get(format!("{}/api/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");
}

#[tokio::test]
async fn test_agent_lifecycle() {
    let (base, _temp_dir) = spawn_server().await;
    let client = reqwest::Client::new();

    // Create
    let response = client
        .post(format!("{}/new_agent", base))
        .json(&agent_payload("faq"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Provisioned resource group agent-faq-rg"));

    // Duplicate names conflict
    let duplicate = client
        .post(format!("{}/new_agent", base))
        .json(&agent_payload("faq"))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), 409);

    // List
    let agents: Vec<Value> = client
        .get(format!("{}/get_agents", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(agents.len(), 1);
    let id = agents[0]["id"].as_i64().unwrap();
    assert_eq!(agents[0]["name"], "agent-faq-rg");
    assert_eq!(agents[0]["status"], "Waiting for approval");
    assert!(agents[0].get("openai_api_key").is_none());

    // Detail with spend
    let detail: Value = client
        .get(format!("{}/get_agent/{}", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["message"], "Success");
    assert_eq!(detail["agent"]["display_name"], "faq");
    assert_eq!(detail["budget"], 20.0);
    assert_eq!(detail["current_spend"]["amount"], 0.0);

    // Local agents have no deployment to chat with
    let chat = client
        .post(format!("{}/chat_completion", base))
        .json(&json!({ "agent_id": id, "user_input": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(chat.status(), 500);
    let error: Value = chat.json().await.unwrap();
    assert_eq!(
        error["error"],
        "OpenAI credentials or deployment not available."
    );

    // Delete
    let deleted = client
        .delete(format!("{}/delete_agent", base))
        .query(&[("id", id)])
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);

    let missing = client
        .get(format!("{}/get_agent/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
    let error: Value = missing.json().await.unwrap();
    assert_eq!(error["status"], 404);
}

#[tokio::test]
async fn test_knowledge_sources_for_agent() {
    let (base, _temp_dir) = spawn_server().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/new_agent", base))
        .json(&agent_payload("support"))
        .send()
        .await
        .unwrap();
    let agents: Vec<Value> = client
        .get(format!("{}/get_agents", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = agents[0]["id"].as_i64().unwrap();

    let created = client
        .post(format!("{}/agents/{}/knowledge_sources", base, id))
        .json(&json!({ "name": "FAQ", "source": "https://website.com/" }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), 201);

    let sources: Vec<Value> = client
        .get(format!("{}/agents/{}/knowledge_sources", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0]["name"], "FAQ");
    assert_eq!(sources[0]["approved"], false);

    let unknown = client
        .get(format!("{}/agents/{}/knowledge_sources", base, id + 1))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), 404);
}

#[tokio::test]
async fn test_invalid_requests() {
    let (base, _temp_dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let blank_name = client
        .post(format!("{}/new_agent", base))
        .json(&agent_payload("   "))
        .send()
        .await
        .unwrap();
    assert_eq!(blank_name.status(), 400);

    let blank_source = client
        .post(format!("{}/knowledge_sources", base))
        .json(&json!({ "name": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank_source.status(), 400);
}
