/// API request handlers
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;

use crate::api::types::ApiResponse;
use crate::api::types::LivenessResponse;
use crate::errors::RcaError;
use crate::rag::AnalysisPipeline;

// Re-export sub-modules
pub mod analyze;
pub mod stats;

// Re-export handlers
pub use analyze::*;
pub use stats::*;

pub const LIVENESS_MESSAGE: &str = "AI Customer Support Root Cause Analyzer is running!";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<AnalysisPipeline>) -> Self {
        Self { pipeline }
    }
}

/// Liveness handler (GET /)
pub async fn root() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        message: LIVENESS_MESSAGE.to_string(),
    })
}

/// Pipeline error rendered as an `ApiResponse` error body
#[derive(Debug)]
pub struct ApiError(pub RcaError);

impl From<RcaError> for ApiError {
    fn from(err: RcaError) -> Self {
        Self(err)
    }
}

/// HTTP status for a pipeline error
#[must_use]
pub const fn status_for(err: &RcaError) -> StatusCode {
    match err {
        RcaError::InferenceFailure(_)
        | RcaError::ParseFailure { .. }
        | RcaError::ValidationFailure { .. } => StatusCode::BAD_GATEWAY,
        RcaError::RetrievalUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = match self.0.raw_output() {
            Some(raw) => format!("{} (raw output: {raw})", self.0),
            None => self.0.to_string(),
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
