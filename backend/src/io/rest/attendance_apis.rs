//! # REST API for Attendance
//!
//! Check-in at the front desk, the admin tardy override and today's summary.

use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::domain::CoreError;
use crate::io::rest::desk_session;
use crate::io::rest::mappers::attendance_mapper::AttendanceMapper;
use crate::AppState;
use shared::{
    AttendanceSummaryResponse, CheckInRequest, CheckInResponse, OverrideTardyRequest,
    OverrideTardyResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/check-in", post(check_in))
        .route("/override-tardy", post(override_tardy))
        .route("/today", get(today_summary))
}

/// Record a check-in for today
pub async fn check_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>, CoreError> {
    info!(
        "POST /api/attendance/check-in - student: {}, session: {}",
        request.student_id, request.session_time
    );

    let session = desk_session(&headers, &state);
    let command = AttendanceMapper::check_in_command(request)?;
    let result = state.attendance_service.check_in(&session, command).await?;
    Ok(Json(AttendanceMapper::check_in_to_dto(result)))
}

/// Turn today's tardy record into an on-time one. Needs the override code, not the desk.
pub async fn override_tardy(
    State(state): State<AppState>,
    Json(request): Json<OverrideTardyRequest>,
) -> Result<Json<OverrideTardyResponse>, CoreError> {
    info!("POST /api/attendance/override-tardy - student: {}", request.student_name);

    let command = AttendanceMapper::override_command(request);
    let record = state.attendance_service.override_tardy(command).await?;
    Ok(Json(AttendanceMapper::override_to_dto(record)))
}

pub async fn today_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AttendanceSummaryResponse>, CoreError> {
    info!("GET /api/attendance/today");

    desk_session(&headers, &state).require_open()?;
    let summary = state.attendance_service.today_summary().await?;
    Ok(Json(AttendanceMapper::summary_to_dto(summary)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use shared::{
        AttendanceStatus, AttendanceSummaryResponse, CheckInResponse, ErrorResponse,
        OverrideTardyResponse,
    };

    use crate::io::rest::test_app::{read_json, TestApp, OVERRIDE_CODE};

    fn check_in_body(student_id: &str, secret: &str) -> serde_json::Value {
        json!({ "student_id": student_id, "session_time": "14:00", "secret": secret })
    }

    #[tokio::test]
    async fn test_lottery_window_check_in() {
        let app = TestApp::at("2025-03-03 13:55").await;
        let minji = app
            .register("Minji", "2012-04-12", "010-1234-5678", ("Mon", "14:00"))
            .await;

        let response = app
            .send(Method::POST, "/api/attendance/check-in", Some(check_in_body(&minji.id, "0412")), true)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let result: CheckInResponse = read_json(response).await;
        assert_eq!(result.status, AttendanceStatus::OnTime);
        assert_eq!(result.points_awarded, 1);
        assert!(result.lottery_candidate);
        assert!(result.celebrate);
        assert_eq!(result.check_in_time, "13:55");
    }

    #[tokio::test]
    async fn test_wrong_secret_and_second_check_in() {
        let app = TestApp::at("2025-03-03 13:55").await;
        let minji = app
            .register("Minji", "2012-04-12", "010-1234-5678", ("Mon", "14:00"))
            .await;

        let response = app
            .send(Method::POST, "/api/attendance/check-in", Some(check_in_body(&minji.id, "1234")), true)
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: ErrorResponse = read_json(response).await;
        assert_eq!(body.code, "IDENTITY_MISMATCH");

        app.send(Method::POST, "/api/attendance/check-in", Some(check_in_body(&minji.id, "0412")), true)
            .await;
        let response = app
            .send(Method::POST, "/api/attendance/check-in", Some(check_in_body(&minji.id, "0412")), true)
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: ErrorResponse = read_json(response).await;
        assert_eq!(body.code, "ALREADY_MARKED");
    }

    #[tokio::test]
    async fn test_marked_student_with_wrong_secret_is_already_marked() {
        let app = TestApp::at("2025-03-03 13:55").await;
        let minji = app
            .register("Minji", "2012-04-12", "010-1234-5678", ("Mon", "14:00"))
            .await;

        app.send(Method::POST, "/api/attendance/check-in", Some(check_in_body(&minji.id, "0412")), true)
            .await;
        let response = app
            .send(Method::POST, "/api/attendance/check-in", Some(check_in_body(&minji.id, "9999")), true)
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: ErrorResponse = read_json(response).await;
        assert_eq!(body.code, "ALREADY_MARKED");
    }

    #[tokio::test]
    async fn test_check_in_for_another_session_is_rejected() {
        let app = TestApp::at("2025-03-03 13:55").await;
        let minji = app
            .register("Minji", "2012-04-12", "010-1234-5678", ("Tue", "14:00"))
            .await;

        let response = app
            .send(Method::POST, "/api/attendance/check-in", Some(check_in_body(&minji.id, "0412")), true)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = read_json(response).await;
        assert_eq!(body.code, "INVALID_INPUT");

        let summary: AttendanceSummaryResponse =
            read_json(app.send(Method::GET, "/api/attendance/today", None, true).await).await;
        assert_eq!(summary.total, 0);
    }

    #[tokio::test]
    async fn test_closed_desk_rejects_check_in() {
        let app = TestApp::at("2025-03-03 13:55").await;
        let minji = app
            .register("Minji", "2012-04-12", "010-1234-5678", ("Mon", "14:00"))
            .await;

        let response = app
            .send(Method::POST, "/api/attendance/check-in", Some(check_in_body(&minji.id, "0412")), false)
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_tardy_override_and_summary() {
        let app = TestApp::at("2025-03-03 14:20").await;
        let minji = app
            .register("Minji", "2012-04-12", "010-1234-5678", ("Mon", "14:00"))
            .await;

        let result: CheckInResponse = read_json(
            app.send(Method::POST, "/api/attendance/check-in", Some(check_in_body(&minji.id, "0412")), true)
                .await,
        )
        .await;
        assert_eq!(result.status, AttendanceStatus::Tardy);
        assert_eq!(result.points_awarded, 0);
        assert!(!result.celebrate);

        let wrong = json!({ "student_name": "Minji", "admin_secret": "guess" });
        let response = app
            .send(Method::POST, "/api/attendance/override-tardy", Some(wrong), false)
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = json!({ "student_name": "Minji", "admin_secret": OVERRIDE_CODE });
        let response = app
            .send(Method::POST, "/api/attendance/override-tardy", Some(body), false)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let overridden: OverrideTardyResponse = read_json(response).await;
        assert_eq!(overridden.status, AttendanceStatus::OnTime);

        let summary: AttendanceSummaryResponse =
            read_json(app.send(Method::GET, "/api/attendance/today", None, true).await).await;
        assert_eq!(summary.date, "2025-03-03");
        assert_eq!(summary.total, 1);
        assert_eq!(summary.entries[0].status, AttendanceStatus::OnTime);
        assert_eq!(summary.entries[0].session_time, "14:00");
    }
}
