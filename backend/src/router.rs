//! HTTP router
//!
//! Route table, request-id middleware, tracing and CORS layers.

use crate::api;
use crate::state::SharedState;
use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use std::time::Instant;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

/// CORS layer allowing the configured dashboard origins
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router
pub fn build_router(state: SharedState, cors_origins: &[String]) -> Router {
    Router::new()
        // Health check and hello world
        .route("/", get(api::hello_world))
        .route("/api/health", get(api::health_check))
        // Agent management
        .route("/new_agent", post(api::agents::new_agent))
        .route("/get_agents", get(api::agents::get_agents))
        .route("/get_agent/:id", get(api::agents::get_agent))
        .route("/delete_agent", delete(api::agents::delete_agent))
        // Chat
        .route("/chat_completion", post(api::chat::chat_completion))
        // Knowledge sources
        .route(
            "/knowledge_sources",
            get(api::knowledge::list_knowledge_sources)
                .post(api::knowledge::create_knowledge_source),
        )
        .route(
            "/agent_knowledge_sources",
            post(api::knowledge::link_knowledge_source),
        )
        .route(
            "/agents/:id/knowledge_sources",
            get(api::knowledge::list_agent_knowledge_sources)
                .post(api::knowledge::add_agent_knowledge_source),
        )
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(cors_layer(cors_origins))
        .with_state(state)
}
