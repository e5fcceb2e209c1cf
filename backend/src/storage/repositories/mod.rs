// Repository modules
pub mod attendance_repository;
pub mod ledger_repository;
pub mod lottery_repository;
pub mod redemption_repository;
pub mod schedule_override_repository;
pub mod shop_item_repository;
pub mod student_repository;

// Re-export repository types
pub use attendance_repository::AttendanceRepository;
pub use ledger_repository::LedgerRepository;
pub use lottery_repository::LotteryRepository;
pub use redemption_repository::RedemptionRepository;
pub use schedule_override_repository::ScheduleOverrideRepository;
pub use shop_item_repository::ShopItemRepository;
pub use student_repository::StudentRepository;

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveTime};

// Column formats for dates and times of day
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S";

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub(crate) fn parse_stored_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| anyhow!("Corrupt date column '{}': {}", value, e))
}

pub(crate) fn parse_stored_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|e| anyhow!("Corrupt time column '{}': {}", value, e))
}
