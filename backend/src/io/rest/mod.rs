//! # REST API Interface Layer
//!
//! HTTP endpoints for the attendance tracker, all nested under `/api`.
//!
//! ## Key Responsibilities
//!
//! - **API Endpoints**: one router per resource, composed in [`api_router`]
//! - **Error Handling**: `CoreError` implements `IntoResponse` (see [`error`])
//! - **Desk Gate**: [`desk_session`] turns the passcode header into a `SessionContext`
//! - **Logging**: every handler logs its request line

use axum::http::HeaderMap;
use axum::Router;

use crate::domain::SessionContext;
use crate::AppState;

pub mod attendance_apis;
pub mod error;
pub mod lottery_apis;
pub mod mappers;
pub mod points_apis;
pub mod ranking_apis;
pub mod redemption_apis;
pub mod schedule_apis;
pub mod shop_apis;
pub mod student_apis;

/// Header carrying the front desk passcode
pub const DESK_PASSCODE_HEADER: &str = "x-desk-passcode";

/// All `/api` routes
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/attendance", attendance_apis::router())
        .nest("/lottery", lottery_apis::router())
        .nest("/points", points_apis::router())
        .nest("/rankings", ranking_apis::router())
        .nest("/shop", shop_apis::router())
        .nest("/redemptions", redemption_apis::router())
        .nest("/students", student_apis::router())
        .merge(schedule_apis::router())
}

/// The desk session for a request, from the passcode header
pub fn desk_session(headers: &HeaderMap, state: &AppState) -> SessionContext {
    let entered = headers
        .get(DESK_PASSCODE_HEADER)
        .and_then(|value| value.to_str().ok());
    SessionContext::from_passcode(entered, &state.config.desk_passcode)
}

#[cfg(test)]
pub(crate) mod test_app {
    //! Router fixture shared by the handler tests.
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, Request, Response};
    use serde::de::DeserializeOwned;
    use serde_json::Value;
    use tower::util::ServiceExt;

    use crate::config::Config;
    use crate::domain::models::lottery::LotteryScope;
    use crate::storage::{DbConnection, PoolSettings};
    use crate::test_support::{clock_at, MutableClock, TEST_OFFSET_MINUTES};
    use crate::{build_state, create_router, AppState};

    pub const PASSCODE: &str = "desk-1234";
    pub const ADMIN_SECRET: &str = "admin-secret";
    pub const OVERRIDE_CODE: &str = "override-9";

    pub struct TestApp {
        pub state: AppState,
        pub clock: Arc<MutableClock>,
    }

    fn test_config() -> Config {
        Config {
            port: 0,
            database_url: String::new(),
            pool: PoolSettings {
                max_connections: 1,
                acquire_timeout: Duration::from_secs(10),
                busy_timeout: Duration::from_secs(5),
            },
            utc_offset_minutes: TEST_OFFSET_MINUTES,
            desk_passcode: PASSCODE.to_string(),
            admin_secret: ADMIN_SECRET.to_string(),
            tardy_override_code: OVERRIDE_CODE.to_string(),
            lottery_exclusions: HashSet::new(),
            lottery_scope: LotteryScope::Date,
            cors_origin: "http://localhost:8080".to_string(),
        }
    }

    impl TestApp {
        /// Fresh in-memory database with the clock at a local "YYYY-MM-DD HH:MM"
        pub async fn at(local: &str) -> Self {
            let db = DbConnection::init_test().await.expect("Failed to create test database");
            let (clock, _) = clock_at(local);
            let state = build_state(db, test_config(), clock.clone()).expect("Failed to build state");
            Self { state, clock }
        }

        pub async fn send(&self, method: Method, uri: &str, body: Option<Value>, open: bool) -> Response<Body> {
            let mut builder = Request::builder().method(method).uri(uri);
            if open {
                builder = builder.header(super::DESK_PASSCODE_HEADER, PASSCODE);
            }
            let request = match body {
                Some(json) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };
            create_router(self.state.clone()).oneshot(request).await.unwrap()
        }

        /// Register a student through the API with a single weekly slot
        pub async fn register(&self, name: &str, birth: &str, phone: &str, slot: (&str, &str)) -> shared::Student {
            let body = serde_json::json!({
                "name": name,
                "birth": birth,
                "guardian_phone": phone,
                "schedules": [{ "weekday": slot.0, "time": slot.1 }],
                "points": {},
                "pause_date": null
            });
            let response = self.send(Method::POST, "/api/students", Some(body), true).await;
            let created: shared::StudentResponse = read_json(response).await;
            created.student
        }
    }

    pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}
