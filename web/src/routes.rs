//! Router configuration for the Todo API.

use crate::error::PanicResponder;
use crate::handlers::{health, route_not_found, todos};
use crate::middleware::request_tracking_layer;
use crate::state::AppState;
use axum::{Router, routing::get};
use tower_http::catch_panic::CatchPanicLayer;

/// Build the complete Axum router.
///
/// Routes:
/// - `GET /healthz`, `GET /metrics`, `GET /`
/// - `GET|POST /api/v1/todos`
/// - `GET|PATCH|DELETE /api/v1/todos/:id`
/// - anything else: 404 "Route not found", including a known path requested
///   with a method it does not serve
///
/// Every route, including the fallback, is wrapped in panic recovery and
/// request tracking.
pub fn build_router(state: AppState) -> Router {
    let expose_details = state.service.is_development();

    let api_routes = Router::new()
        .route(
            "/todos",
            get(todos::list_todos)
                .post(todos::create_todo)
                .fallback(route_not_found),
        )
        .route(
            "/todos/:id",
            get(todos::get_todo)
                .patch(todos::update_todo)
                .delete(todos::delete_todo)
                .fallback(route_not_found),
        );

    // Method routers carry their own fallback; without it axum answers an
    // unsupported method with an empty 405
    Router::new()
        .route("/healthz", get(health::healthz).fallback(route_not_found))
        .route("/metrics", get(health::metrics).fallback(route_not_found))
        .route("/", get(health::root).fallback(route_not_found))
        .nest("/api/v1", api_routes)
        .fallback(route_not_found)
        // Layers apply to the routes and fallback registered above
        .layer(CatchPanicLayer::custom(PanicResponder::new(expose_details)))
        .layer(request_tracking_layer())
        .with_state(state)
}
