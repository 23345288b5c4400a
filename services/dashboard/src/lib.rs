//! Launch-site nowcasting dashboard.
//!
//! Wires configuration tables, a patch source and the loaded models into a
//! session view-model, then serves it over HTTP or renders it once from the
//! command line.

pub mod config;
pub mod handlers;
pub mod pipeline;
pub mod session;
pub mod state;
pub mod view;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the HTTP router.
pub fn build_router(state: Arc<AppState>, prometheus: PrometheusHandle) -> Router {
    Router::new()
        // Pages
        .route("/", get(handlers::home_handler))
        .route("/demo", get(handlers::demo_handler))
        .route("/figures/:name", get(handlers::figure_handler))
        // JSON API
        .route("/api/session", post(handlers::session_handler))
        .route("/api/launches", get(handlers::launches_handler))
        .route("/api/models", get(handlers::models_handler))
        // Health and metrics
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(Extension(state))
        .layer(Extension(prometheus))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
