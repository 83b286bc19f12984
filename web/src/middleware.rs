//! Axum middleware for request tracking and observability.
//!
//! [`RequestTrackingLayer`] wraps every route and the fallback. Per request it:
//!
//! 1. **Extracts** the request id from `X-Request-ID` (or generates a UUID)
//! 2. **Stores** it in request extensions as [`RequestId`]
//! 3. **Creates** an `http_request` span with the id, method and path
//! 4. **Logs** "Incoming request" and "Request completed"
//! 5. **Records** `http_request_duration_seconds` and `http_requests_total`
//! 6. **Echoes** the id in the response `X-Request-ID` header
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use todo_api_web::middleware::request_tracking_layer;
//!
//! let app = Router::new()
//!     .route("/api/v1/todos", get(list_todos))
//!     .layer(request_tracking_layer());
//! ```
//!
//! The layer must be added with `Router::layer` (not around the finished
//! router) so the matched route template is available for the `route` label.

use crate::metrics;
use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderValue, Response},
};
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for the request id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Request id stored in request extensions by [`RequestTrackingLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

/// Create a layer that tracks, logs and measures every request.
#[must_use]
pub const fn request_tracking_layer() -> RequestTrackingLayer {
    RequestTrackingLayer
}

/// Layer for request tracking.
#[derive(Clone, Debug)]
pub struct RequestTrackingLayer;

impl<S> Layer<S> for RequestTrackingLayer {
    type Service = RequestTracking<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestTracking { inner }
    }
}

/// Middleware service for request tracking.
#[derive(Clone, Debug)]
pub struct RequestTracking<S> {
    inner: S,
}

impl<S, B> Service<Request> for RequestTracking<S>
where
    S: Service<Request, Response = Response<B>> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);
        req.extensions_mut().insert(RequestId(request_id));

        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map_or_else(|| path.clone(), |matched| matched.as_str().to_string());

        let span = tracing::info_span!(
            "http_request",
            request_id = %request_id,
            method = %method,
            path = %path,
        );

        let started = Instant::now();
        let fut = {
            let _entered = span.enter();
            tracing::info!("Incoming request");
            self.inner.call(req)
        };

        Box::pin(
            async move {
                let mut response = fut.await?;

                let elapsed = started.elapsed();
                let status = response.status().as_u16();
                tracing::info!(
                    status,
                    duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    "Request completed"
                );
                metrics::record_http_request(&method, &route, status, elapsed);

                if let Ok(header_value) = HeaderValue::from_str(&request_id.to_string()) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}
