//! # Storage Module
//!
//! Persists students, point balances, attendance, lottery state and the point
//! shop in SQLite through SQLx.
//!
//! ## Key Responsibilities
//!
//! - **Connection Management**: pool setup, schema creation and the startup migration
//! - **Conditional Writes**: every check-then-act rule is a single statement
//!   (`ON CONFLICT DO NOTHING`, `WHERE winner_name IS NULL`, `WHERE spendable_points >= ?`)
//! - **Transaction Participation**: repository methods that take part in a
//!   larger unit of work accept a `&mut SqliteConnection`, so callers can pass
//!   an open transaction
//! - **Retry Boundary**: `retry_once` repeats a whole operation once on a
//!   transient storage fault
//!
//! Repositories return `anyhow::Result`; the domain layer maps failures onto
//! its own error type.

pub mod connection;
pub mod migration;
pub mod repositories;

// Re-export the main types that other modules need
pub use connection::{is_transient_sqlx, retry_once, DbConnection, PoolSettings, RetryableError};
pub use repositories::{
    AttendanceRepository, LedgerRepository, LotteryRepository, RedemptionRepository,
    ScheduleOverrideRepository, ShopItemRepository, StudentRepository,
};
