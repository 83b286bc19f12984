//! Error types for web handlers.
//!
//! [`AppError`] is the single translation point from validation, lookup and
//! storage failures to HTTP responses. Every error renders the same envelope:
//!
//! ```json
//! { "success": false, "error": "Validation failed", "message": "Title is required and must be a non-empty string" }
//! ```
//!
//! Not-found errors carry the offending `id` or `path` instead of a message.

use axum::{
    Json,
    body::Body,
    http::{Response as HttpResponse, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::any::Any;
use std::fmt;
use todo_api_core::{StoreError, TodoId, ValidationError};
use tower_http::catch_panic::ResponseForPanic;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Todo>, AppError> {
///     let id = TodoId::from(id);
///     let todo = state.store.get_todo_by_id(&id).await
///         .map_err(|e| AppError::storage("Failed to fetch todo", e))?
///         .ok_or_else(|| AppError::todo_not_found(&id))?;
///     Ok(Json(todo))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Short error label (the `error` field)
    error: String,
    /// Detail for the client, if any
    message: Option<String>,
    /// Id of the missing Todo
    id: Option<String>,
    /// Unmatched request path
    path: Option<String>,
    /// Internal error (for logging)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: None,
            id: None,
            path: None,
            source: None,
        }
    }

    /// Attach a client-facing message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// 400 "Validation failed".
    #[must_use]
    pub fn validation(err: &ValidationError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation failed").with_message(err.to_string())
    }

    /// 400 "Invalid JSON body".
    #[must_use]
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid JSON body").with_message(message)
    }

    /// 404 "Todo not found".
    #[must_use]
    pub fn todo_not_found(id: &TodoId) -> Self {
        let mut err = Self::new(StatusCode::NOT_FOUND, "Todo not found");
        err.id = Some(id.to_string());
        err
    }

    /// 404 "Route not found".
    #[must_use]
    pub fn route_not_found(path: impl Into<String>) -> Self {
        let mut err = Self::new(StatusCode::NOT_FOUND, "Route not found");
        err.path = Some(path.into());
        err
    }

    /// 500 labelled `error`, with the storage failure as the message.
    #[must_use]
    pub fn storage(error: &'static str, err: StoreError) -> Self {
        let message = err.to_string();
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
            .with_message(message)
            .with_source(anyhow::Error::new(err))
    }

    /// 500 "Internal server error".
    #[must_use]
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    /// HTTP status this error renders with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "[{}] {}: {message}", self.status.as_u16(), self.error),
            None => write!(f, "[{}] {}", self.status.as_u16(), self.error),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::validation(&err)
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    error = %self.error,
                    source = %source,
                    "Request failed"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    error = %self.error,
                    detail = self.message.as_deref().unwrap_or_default(),
                    "Request failed"
                );
            }
        } else {
            tracing::warn!(
                status = %self.status,
                error = %self.error,
                detail = self.message.as_deref().unwrap_or_default(),
                id = self.id.as_deref().unwrap_or_default(),
                path = self.path.as_deref().unwrap_or_default(),
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            success: false,
            error: self.error,
            message: self.message,
            id: self.id,
            path: self.path,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Turns a handler panic into a 500 [`AppError`] response.
///
/// The panic payload is passed to the client as `message` only in development.
#[derive(Debug, Clone, Copy)]
pub struct PanicResponder {
    expose_details: bool,
}

impl PanicResponder {
    /// Create a responder; `expose_details` puts the panic message in the body.
    #[must_use]
    pub const fn new(expose_details: bool) -> Self {
        Self { expose_details }
    }
}

impl ResponseForPanic for PanicResponder {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> HttpResponse<Body> {
        let details = if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = err.downcast_ref::<&str>() {
            (*s).to_string()
        } else {
            "unknown panic payload".to_string()
        };

        tracing::error!(panic = %details, "Handler panicked");

        let error = AppError::internal();
        if self.expose_details {
            error.with_message(details).into_response()
        } else {
            error.into_response()
        }
    }
}
