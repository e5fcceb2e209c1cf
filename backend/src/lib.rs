//! # Attendance Tracker Backend
//!
//! Check-in classification, incentive points, the daily lucky draw,
//! leaderboards and point redemptions for a tutoring desk.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! Front desk UI
//!     ↓
//! IO Layer (REST API, handlers, DTO mappers)
//!     ↓
//! Domain Layer (Business rules, services)
//!     ↓
//! Storage Layer (SQLite, conditional writes)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Load configuration and initialize the application state
//! - Set up the REST API router with CORS
//! - Keep every multi-step write inside a single storage transaction

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{
    AttendanceService, LedgerService, LocalClock, LotteryService, RankingService,
    RedemptionService, ScheduleService, StudentService,
};
use crate::storage::{
    AttendanceRepository, DbConnection, LedgerRepository, LotteryRepository,
    ScheduleOverrideRepository, StudentRepository,
};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub student_service: StudentService,
    pub schedule_service: ScheduleService,
    pub attendance_service: AttendanceService,
    pub lottery_service: LotteryService,
    pub ledger_service: LedgerService,
    pub ranking_service: RankingService,
    pub redemption_service: RedemptionService,
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: Config) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url, &config.pool).await?;

    build_state(db, config, Arc::new(DefaultClock))
}

/// Wire services over an open database and a clock
pub fn build_state(
    db: DbConnection,
    config: Config,
    clock: Arc<dyn Clock + Send + Sync>,
) -> Result<AppState> {
    info!("Setting up domain model");
    let local_clock = LocalClock::new(clock, config.utc_offset_minutes)?;

    let students = StudentRepository::new(db.clone());
    let ledger = LedgerRepository::new(db.clone());

    let lottery_service = LotteryService::new(
        db.clone(),
        LotteryRepository::new(db.clone()),
        ledger.clone(),
        config.lottery_scope,
        config.lottery_exclusions.clone(),
        local_clock.clone(),
    );

    let app_state = AppState {
        student_service: StudentService::new(students.clone()),
        schedule_service: ScheduleService::new(
            students.clone(),
            ScheduleOverrideRepository::new(db.clone()),
            AttendanceRepository::new(db.clone()),
            local_clock.clone(),
        ),
        attendance_service: AttendanceService::new(
            db.clone(),
            lottery_service.clone(),
            local_clock.clone(),
            config.tardy_override_code.clone(),
        ),
        lottery_service,
        ledger_service: LedgerService::new(students.clone(), ledger),
        ranking_service: RankingService::new(students),
        redemption_service: RedemptionService::new(db, local_clock, config.admin_secret.clone()),
        config: Arc::new(config),
    };

    info!("Application state ready");
    Ok(app_state)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    // CORS setup to allow the desk frontend to make requests
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);
    let cors = match app_state.config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            warn!(
                "Invalid CORS origin '{}', allowing any origin",
                app_state.config.cors_origin
            );
            cors.allow_origin(Any)
        }
    };

    Router::new()
        .nest("/api", io::rest::api_router())
        .layer(cors)
        .with_state(app_state)
}
