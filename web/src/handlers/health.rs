//! Service endpoints: liveness, metrics exposition and the API index.
//!
//! These endpoints never touch the store.

use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;
use todo_api_core::todo::timestamp;

/// Content type of the Prometheus text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests
    pub status: &'static str,
    /// Current server time
    pub timestamp: String,
    /// Build/commit identifier
    pub commit: String,
    /// Deployment environment tag
    pub environment: String,
}

/// Liveness check.
///
/// Does NOT check the store; a running process is a healthy process.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/healthz
/// # {"status":"ok","timestamp":"2024-01-01T00:00:00.000Z",
/// #  "commit":"unknown","environment":"development"}
/// ```
#[allow(clippy::unused_async)]
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: timestamp::format(&Utc::now()),
        commit: state.service.commit.clone(),
        environment: state.service.environment.clone(),
    })
}

/// Prometheus scrape endpoint.
#[allow(clippy::unused_async)]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render(),
    )
}

/// Endpoint map returned by `GET /`.
#[derive(Debug, Serialize)]
pub struct Endpoints {
    /// Liveness path
    pub health: &'static str,
    /// Metrics path
    pub metrics: &'static str,
    /// Todo collection path
    pub todos: &'static str,
}

/// API index response.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    /// Service name
    pub name: &'static str,
    /// Service version
    pub version: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Available endpoints
    pub endpoints: Endpoints,
}

/// API index.
#[allow(clippy::unused_async)]
pub async fn root() -> Json<IndexResponse> {
    Json(IndexResponse {
        name: "Todo API",
        version: env!("CARGO_PKG_VERSION"),
        description: "Todo service with in-memory and DynamoDB storage",
        endpoints: Endpoints {
            health: "/healthz",
            metrics: "/metrics",
            todos: "/api/v1/todos",
        },
    })
}
