//! Axum API server.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::routes;
use crate::config::ServerConfig;
use crate::workflow::SessionWorkflow;

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    /// The submit/fetch orchestrator, injected at startup.
    pub workflow: Arc<SessionWorkflow>,
}

impl AppState {
    pub fn new(workflow: Arc<SessionWorkflow>) -> Self {
        Self { workflow }
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    // The submit form is embedded on third-party pages, so any origin may
    // call the API. Methods outside GET/POST/OPTIONS get a router-level 405.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/api/health", get(routes::health::get_health))
        .route(
            "/api/dreams",
            post(routes::dreams::submit_dream).get(routes::dreams::fetch_dream),
        )
        // Dream narratives are small; 64 KiB rejects oversized payloads
        // before any JSON parsing.
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(cors)
        .with_state(shared_state)
}

/// Start the API server.
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_router(state);
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("API server listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
