//! # REST API for Point Redemptions
//!
//! Spending points on shop items, the redemption log and admin reversals.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{delete, get},
    Router,
};
use tracing::info;

use crate::domain::commands::redemption::ReverseRedemptionCommand;
use crate::domain::CoreError;
use crate::io::rest::desk_session;
use crate::io::rest::mappers::redemption_mapper::RedemptionMapper;
use crate::AppState;
use shared::{
    RedeemRequest, RedemptionLogResponse, ReverseRedemptionRequest, ReverseRedemptionResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_redemptions).post(redeem))
        .route("/:id", delete(reverse_redemption))
}

/// Spend points on an item, identified by the redemption code
pub async fn redeem(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RedeemRequest>,
) -> Result<impl IntoResponse, CoreError> {
    info!("POST /api/redemptions - item: {}", request.item_id);

    let session = desk_session(&headers, &state);
    let command = RedemptionMapper::redeem_command(request);
    let result = state.redemption_service.redeem(&session, command).await?;
    Ok((StatusCode::CREATED, Json(RedemptionMapper::redeem_to_dto(result))))
}

/// Newest entries first
pub async fn list_redemptions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RedemptionLogResponse>, CoreError> {
    info!("GET /api/redemptions");

    desk_session(&headers, &state).require_open()?;
    let entries = state.redemption_service.list_log().await?;
    Ok(Json(RedemptionLogResponse {
        entries: entries.into_iter().map(RedemptionMapper::entry_to_dto).collect(),
    }))
}

/// Delete a log entry and restore its points. Guarded by the admin secret only.
pub async fn reverse_redemption(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    Json(request): Json<ReverseRedemptionRequest>,
) -> Result<Json<ReverseRedemptionResponse>, CoreError> {
    info!("DELETE /api/redemptions/{}", entry_id);

    let command = ReverseRedemptionCommand {
        entry_id,
        admin_secret: request.admin_secret,
    };
    let result = state.redemption_service.reverse(command).await?;
    Ok(Json(RedemptionMapper::reverse_to_dto(result)))
}
