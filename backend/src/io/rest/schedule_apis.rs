//! # REST API for Schedules
//!
//! The session roster shown at the desk and dated schedule overrides.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::domain::CoreError;
use crate::io::rest::desk_session;
use crate::io::rest::mappers::date_from_dto;
use crate::io::rest::mappers::student_mapper::StudentMapper;
use crate::AppState;
use shared::{CreateScheduleOverrideRequest, SessionRosterResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions/today", get(sessions_today))
        .route("/sessions/:date", get(sessions_on))
        .route("/schedule-overrides", post(create_override))
}

/// Today's students grouped by session time
pub async fn sessions_today(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionRosterResponse>, CoreError> {
    info!("GET /api/sessions/today");

    desk_session(&headers, &state).require_open()?;
    let roster = state.schedule_service.sessions_today().await?;
    Ok(Json(StudentMapper::roster_to_dto(roster)))
}

pub async fn sessions_on(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(date): Path<String>,
) -> Result<Json<SessionRosterResponse>, CoreError> {
    info!("GET /api/sessions/{}", date);

    desk_session(&headers, &state).require_open()?;
    let date = date_from_dto(&date)?;
    let roster = state.schedule_service.sessions_on(date).await?;
    Ok(Json(StudentMapper::roster_to_dto(roster)))
}

/// Replace a student's weekly schedule from a date onwards
pub async fn create_override(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateScheduleOverrideRequest>,
) -> Result<impl IntoResponse, CoreError> {
    info!(
        "POST /api/schedule-overrides - student: {}, effective: {}",
        request.student_id, request.effective_date
    );

    let session = desk_session(&headers, &state);
    let command = StudentMapper::override_command_from_request(request)?;
    let created = state
        .schedule_service
        .create_override(&session, command)
        .await?;
    Ok((StatusCode::CREATED, Json(StudentMapper::override_to_dto(created))))
}
