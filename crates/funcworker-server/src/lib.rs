pub mod config;
pub mod error;
pub mod functions;
pub mod invoke;
pub mod routes;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

pub use config::WorkerConfig;
pub use error::ApiError;
pub use routes::{RouteDescriptor, ROUTES};

#[derive(Clone)]
pub struct AppState {
    routes: &'static [RouteDescriptor],
}

/// Builds the worker router: one POST route per function plus `/health`.
pub fn create_app(routes: &'static [RouteDescriptor]) -> Router {
    let mut router = Router::new().route("/health", get(health_handler));

    for route in routes.iter().copied() {
        router = router.route(
            route.path,
            post(move |headers: HeaderMap, body: Bytes| invoke::invoke(route, headers, body)),
        );
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { routes })
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let functions: Vec<serde_json::Value> = state
        .routes
        .iter()
        .map(|route| {
            serde_json::json!({
                "name": route.function,
                "path": route.path,
                "trigger": route.trigger,
            })
        })
        .collect();

    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "functions": functions,
    }))
}
