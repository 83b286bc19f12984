//! HTTP surface of the Todo API.
//!
//! This crate turns a [`TodoStore`](todo_api_core::TodoStore) into an axum
//! [`Router`](axum::Router). It owns everything between the socket and the
//! store: routing, JSON envelopes, validation, error translation, request
//! tracking and Prometheus metrics.
//!
//! # Request Flow
//!
//! 1. **Track**: request id, span, "Incoming request" log
//! 2. **Extract** the JSON body ([`ApiJson`]) and path parameters
//! 3. **Validate** into domain types ([`Title`](todo_api_core::Title),
//!    [`TodoUpdate`](todo_api_core::TodoUpdate))
//! 4. **Call** the store exactly once
//! 5. **Map result** to a response envelope, or an [`AppError`]
//! 6. **Record** latency and request count, "Request completed" log
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo_api_core::MemoryTodoStore;
//! use todo_api_web::{AppState, ServiceInfo, build_router, metrics};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let state = AppState::new(
//!     Arc::new(MemoryTodoStore::new()),
//!     metrics::install_recorder()?,
//!     ServiceInfo::default(),
//! );
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, build_router(state)).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::ApiJson;
pub use middleware::{REQUEST_ID_HEADER, RequestId, request_tracking_layer};
pub use routes::build_router;
pub use state::{AppState, ServiceInfo};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
