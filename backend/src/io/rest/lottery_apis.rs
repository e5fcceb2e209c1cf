//! # REST API for the Lucky Draw
//!
//! Read a lottery's candidates and winner, or resolve it once its window closed.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::domain::CoreError;
use crate::io::rest::desk_session;
use crate::io::rest::mappers::lottery_mapper::LotteryMapper;
use crate::AppState;
use shared::{LotteryStateResponse, ResolveLotteryRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/resolve", post(resolve_lottery))
        .route("/:key", get(get_lottery))
}

pub async fn get_lottery(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(lottery_key): Path<String>,
) -> Result<Json<LotteryStateResponse>, CoreError> {
    info!("GET /api/lottery/{}", lottery_key);

    desk_session(&headers, &state).require_open()?;
    let lottery = state.lottery_service.state(&lottery_key).await?;
    Ok(Json(LotteryMapper::state_to_dto(lottery)))
}

/// Draw a winner now if nobody has been drawn yet
pub async fn resolve_lottery(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ResolveLotteryRequest>,
) -> Result<Json<LotteryStateResponse>, CoreError> {
    info!("POST /api/lottery/resolve - key: {}", request.lottery_key);

    let session = desk_session(&headers, &state);
    let command = LotteryMapper::resolve_command(request)?;
    let lottery = state.lottery_service.resolve_now(&session, command).await?;
    Ok(Json(LotteryMapper::state_to_dto(lottery)))
}
