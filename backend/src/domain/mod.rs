//! # Domain Module
//!
//! Business rules of the attendance tracker: punctuality classification,
//! the point ledger, the lucky draw, leaderboards and point redemptions.
//!
//! ## Module Organization
//!
//! - **student_service**: Student registration and legacy document import
//! - **schedule_service**: Effective schedules, dated overrides and the session roster
//! - **attendance_service**: Check-ins, tardy overrides and the day summary
//! - **lottery_service**: Candidate enrollment and the once-only winner draw
//! - **ledger_service**: Manual point adjustments and balances
//! - **ranking_service**: Tie-aware top-N leaderboards
//! - **redemption_service**: Shop catalog, redemptions and reversals
//!
//! ## Business Rules
//!
//! - A student checks in at most once per calendar date
//! - Check-ins 10 minutes before to 5 minutes after the session start enter the draw
//! - Each lottery key has at most one winner, and it never changes once set
//! - Category points never drop below zero; neither does the spendable balance
//! - Spendable points grow only through earned awards and reversals, and shrink only through redemptions
//!
//! Services receive a [`session::SessionContext`] from the edge instead of
//! reading any global desk state, and read time only through [`local_clock::LocalClock`].

pub mod attendance_service;
pub mod commands;
pub mod errors;
pub mod ledger_service;
pub mod local_clock;
pub mod lottery_service;
pub mod models;
pub mod ranking_service;
pub mod redemption_service;
pub mod schedule_service;
pub mod session;
pub mod student_service;

pub use attendance_service::AttendanceService;
pub use errors::{CoreError, CoreResult};
pub use ledger_service::LedgerService;
pub use local_clock::LocalClock;
pub use lottery_service::LotteryService;
pub use ranking_service::RankingService;
pub use redemption_service::RedemptionService;
pub use schedule_service::ScheduleService;
pub use session::SessionContext;
pub use student_service::StudentService;
