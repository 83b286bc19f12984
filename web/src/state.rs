//! Application state for Axum handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use todo_api_core::TodoStore;

/// Deployment facts reported by `/healthz`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    /// Deployment environment tag (e.g. "development", "production")
    pub environment: String,
    /// Build/commit identifier
    pub commit: String,
}

impl ServiceInfo {
    /// Create service info.
    pub fn new(environment: impl Into<String>, commit: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            commit: commit.into(),
        }
    }

    /// Whether internal error details may be shown to clients.
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self::new("development", "unknown")
    }
}

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via `Arc`) for each request. The store is the one backend
/// chosen at startup; handlers never know which implementation it is.
#[derive(Clone)]
pub struct AppState {
    /// The Todo backend
    pub store: Arc<dyn TodoStore>,

    /// Handle for rendering `/metrics`
    pub metrics: PrometheusHandle,

    /// Environment and commit
    pub service: Arc<ServiceInfo>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn TodoStore>, metrics: PrometheusHandle, service: ServiceInfo) -> Self {
        Self {
            store,
            metrics,
            service: Arc::new(service),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.store.backend())
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone() {
        // Ensure AppState implements Clone (required for Axum)
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_only_development_exposes_details() {
        assert!(ServiceInfo::default().is_development());
        assert!(!ServiceInfo::new("production", "abc123").is_development());
    }
}
