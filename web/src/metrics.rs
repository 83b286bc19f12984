//! Prometheus metrics for the Todo API.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `http_requests_total{method, route, status_code}` - Requests served
//! - `todos_created_total` - Todos created since start
//!
//! ## Gauges
//! - `todos_total` - Todos currently stored, refreshed after reads and writes
//!
//! ## Histograms
//! - `http_request_duration_seconds{method, route, status_code}` - Request latency
//!
//! The recorder is process-global. [`install_recorder`] installs it on first
//! use and hands out clones of the same [`PrometheusHandle`] afterwards.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Latency histogram.
pub const HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
/// Request counter.
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
/// Creation counter.
pub const TODOS_CREATED_TOTAL: &str = "todos_created_total";
/// Stored Todo gauge.
pub const TODOS_TOTAL: &str = "todos_total";

const DURATION_BUCKETS: &[f64] = &[0.1, 0.5, 1.0, 2.0, 5.0];

static HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Errors from metrics setup.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Install the Prometheus recorder, or return the handle of the one already installed.
///
/// # Errors
///
/// Returns error if the exporter cannot be built, or if a recorder not
/// installed through this function already owns the process.
pub fn install_recorder() -> Result<PrometheusHandle, MetricsError> {
    let mut slot = HANDLE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(HTTP_REQUEST_DURATION.to_string()),
            DURATION_BUCKETS,
        )
        .map_err(|e| MetricsError::Build(e.to_string()))?
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    register_metrics();
    tracing::info!("Prometheus recorder installed");

    *slot = Some(handle.clone());
    Ok(handle)
}

fn register_metrics() {
    describe_histogram!(
        HTTP_REQUEST_DURATION,
        metrics::Unit::Seconds,
        "Duration of HTTP requests in seconds"
    );
    describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests");
    describe_counter!(TODOS_CREATED_TOTAL, "Total number of todos created");
    describe_gauge!(TODOS_TOTAL, "Current number of todos");
}

/// Record one served request.
pub fn record_http_request(method: &str, route: &str, status: u16, elapsed: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status_code", status.to_string()),
    ];
    histogram!(HTTP_REQUEST_DURATION, &labels).record(elapsed.as_secs_f64());
    counter!(HTTP_REQUESTS_TOTAL, &labels).increment(1);
}

/// Count a created Todo.
pub fn record_todo_created() {
    counter!(TODOS_CREATED_TOTAL).increment(1);
}

/// Set the stored Todo gauge.
#[allow(clippy::cast_precision_loss)]
pub fn set_todos_total(total: usize) {
    gauge!(TODOS_TOTAL).set(total as f64);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_install_is_idempotent() {
        let _first = install_recorder().unwrap();
        let second = install_recorder().unwrap();

        record_todo_created();
        set_todos_total(3);
        record_http_request("GET", "/api/v1/todos", 200, Duration::from_millis(20));

        let rendered = second.render();
        assert!(rendered.contains(TODOS_CREATED_TOTAL));
        assert!(rendered.contains("todos_total 3"));
        assert!(rendered.contains(r#"route="/api/v1/todos""#));
        assert!(rendered.contains("http_request_duration_seconds_bucket"));
        assert!(rendered.contains(r#"le="0.1""#));
    }
}
