//! API request and response types

use serde::Deserialize;
use serde::Serialize;

/// Standard API response wrapper, used for error bodies
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Liveness response for `GET /`
#[derive(Debug, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub message: String,
}

/// Query parameters of `POST /analyze_ticket`
#[derive(Debug, Default, Deserialize)]
pub struct TicketQuery {
    #[serde(default)]
    pub ticket: Option<String>,
}

/// Index statistics for `GET /stats`
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub indexed_incidents: usize,
    pub top_k: usize,
    pub model: String,
}
