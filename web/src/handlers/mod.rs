//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by resource.

pub mod health;
pub mod todos;

use crate::error::AppError;
use axum::extract::OriginalUri;

/// Fallback for unmatched paths and for unsupported methods on known paths.
///
/// Reads the original URI so nested routes report the full request path.
#[allow(clippy::unused_async)]
pub async fn route_not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::route_not_found(uri.path())
}
