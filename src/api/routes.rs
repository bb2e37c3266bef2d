//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create the service router
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        // Liveness
        .route("/", get(handlers::root))
        // Analysis
        .route("/analyze_ticket", post(handlers::analyze_ticket))
        // Statistics
        .route("/stats", get(handlers::get_stats))
        .with_state(state)
}
