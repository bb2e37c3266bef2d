/// Stats-related API handlers
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::types::StatsResponse;

/// Get stats (GET /stats)
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    info!("GET /stats");

    Json(StatsResponse {
        indexed_incidents: state.pipeline.index().len().await,
        top_k: state.pipeline.top_k(),
        model: state.pipeline.model_name().to_string(),
    })
}
