/// Ticket analysis handler
use axum::body::Bytes;
use axum::extract::Query;
use axum::extract::State;
use axum::Json;
use serde_json::Value;
use tracing::debug;
use tracing::info;

use super::ApiError;
use super::AppState;
use crate::api::types::TicketQuery;
use crate::models::RootCauseAnalysis;

/// Analyze a ticket (POST /analyze_ticket)
///
/// Dropping this future on client disconnect cancels the model call.
pub async fn analyze_ticket(
    State(state): State<AppState>,
    Query(query): Query<TicketQuery>,
    body: Bytes,
) -> Result<Json<RootCauseAnalysis>, ApiError> {
    let ticket = ticket_text(query, &body);
    info!("POST /analyze_ticket ({} chars)", ticket.chars().count());

    let analysis = state.pipeline.analyze(&ticket).await?;
    debug!("Analysis result: {:?}", analysis);
    Ok(Json(analysis))
}

/// Ticket text from the query string, a JSON `ticket` field, or the raw body
pub fn ticket_text(query: TicketQuery, body: &[u8]) -> String {
    if let Some(ticket) = query.ticket {
        return ticket;
    }

    if let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(body) {
        if let Some(Value::String(ticket)) = object.get("ticket") {
            return ticket.clone();
        }
    }

    String::from_utf8_lossy(body).into_owned()
}
