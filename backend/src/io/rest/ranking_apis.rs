//! # REST API for Leaderboards
//!
//! `GET /api/rankings/{category}` ranks one point category; `total` ranks the
//! sum of all categories.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
    routing::get,
    Router,
};
use tracing::info;

use crate::domain::CoreError;
use crate::io::rest::desk_session;
use crate::io::rest::mappers::category_from_dto;
use crate::io::rest::mappers::ledger_mapper::LedgerMapper;
use crate::AppState;
use shared::RankingResponse;

const TOTAL: &str = "total";

pub fn router() -> Router<AppState> {
    Router::new().route("/:category", get(get_rankings))
}

pub async fn get_rankings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(category): Path<String>,
) -> Result<Json<RankingResponse>, CoreError> {
    info!("GET /api/rankings/{}", category);

    desk_session(&headers, &state).require_open()?;
    let groups = if category.eq_ignore_ascii_case(TOTAL) {
        state.ranking_service.total_rankings().await?
    } else {
        let category = category_from_dto(&category)?;
        state.ranking_service.top_rankings(category).await?
    };

    Ok(Json(LedgerMapper::ranking_to_dto(&category, groups)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use shared::RankingResponse;

    use crate::io::rest::test_app::{read_json, TestApp};

    #[tokio::test]
    async fn test_ties_share_a_rank() {
        let app = TestApp::at("2025-03-03 13:00").await;
        for (name, exam) in [("Ara", 4), ("Bora", 4), ("Chae", 2)] {
            let student = app
                .register(name, "2012-01-01", "010-0000-0000", ("Mon", "14:00"))
                .await;
            let body = json!({ "student_id": student.id, "category": "exam", "delta": exam });
            app.send(Method::POST, "/api/points/adjust", Some(body), true).await;
        }

        let ranking: RankingResponse =
            read_json(app.send(Method::GET, "/api/rankings/exam", None, true).await).await;
        assert_eq!(ranking.groups.len(), 2);
        assert_eq!(ranking.groups[0].rank, 1);
        assert_eq!(ranking.groups[0].names, vec!["Ara", "Bora"]);
        assert_eq!(ranking.groups[1].rank, 2);
        assert_eq!(ranking.groups[1].value, 2);

        let total: RankingResponse =
            read_json(app.send(Method::GET, "/api/rankings/total", None, true).await).await;
        assert_eq!(total.category, "total");
        assert_eq!(total.groups[0].value, 4);
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let app = TestApp::at("2025-03-03 13:00").await;
        let response = app.send(Method::GET, "/api/rankings/karma", None, true).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
