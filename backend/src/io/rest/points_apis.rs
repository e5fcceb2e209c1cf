//! # REST API for Manual Point Adjustments

use axum::{extract::State, http::HeaderMap, response::Json, routing::post, Router};
use tracing::info;

use crate::domain::CoreError;
use crate::io::rest::desk_session;
use crate::io::rest::mappers::ledger_mapper::LedgerMapper;
use crate::AppState;
use shared::{AdjustPointsRequest, AdjustPointsResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/adjust", post(adjust_points))
}

/// Add or remove points in one category; the result never drops below zero
pub async fn adjust_points(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AdjustPointsRequest>,
) -> Result<Json<AdjustPointsResponse>, CoreError> {
    info!(
        "POST /api/points/adjust - student: {}, category: {}, delta: {}",
        request.student_id, request.category, request.delta
    );

    let session = desk_session(&headers, &state);
    let command = LedgerMapper::adjust_command(request)?;
    let result = state.ledger_service.adjust(&session, command).await?;
    Ok(Json(LedgerMapper::adjust_to_dto(result)))
}
