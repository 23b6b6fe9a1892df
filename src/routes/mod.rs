pub mod content_units;
pub mod health;
pub mod replicate;

use crate::metrics;
use crate::services::AppState;
use axum::routing::get;
use axum::Router;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Replication walks every document and language sequentially, so the
/// trigger endpoint gets a generous timeout.
const REQUEST_TIMEOUT_SECS: u64 = 600;

pub fn create_router(state: AppState) -> Router {
    let (prometheus_layer, metrics_router) = metrics::setup_metrics();

    let api_routes = Router::new()
        .route("/replicate", get(replicate::replicate_all))
        .route("/content-units", get(content_units::list_preview_units))
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .route("/health", get(health::health_check))
        .merge(metrics_router)
        .layer(prometheus_layer)
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(TraceLayer::new_for_http())
}
