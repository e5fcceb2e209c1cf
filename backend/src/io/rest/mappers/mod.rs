//! Conversions between the `shared` DTOs and domain types.
//!
//! Parsing of dates, times, weekdays and categories happens here; a value
//! that does not parse becomes `CoreError::InvalidInput`.
use chrono::{NaiveDate, NaiveTime};

use crate::domain::models::points::PointCategory;
use crate::domain::models::schedule::{parse_date, parse_time_of_day};
use crate::domain::CoreError;

pub mod attendance_mapper;
pub mod ledger_mapper;
pub mod lottery_mapper;
pub mod redemption_mapper;
pub mod student_mapper;

pub fn date_to_dto(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn time_to_dto(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn date_from_dto(value: &str) -> Result<NaiveDate, CoreError> {
    parse_date(value).map_err(CoreError::InvalidInput)
}

pub fn time_from_dto(value: &str) -> Result<NaiveTime, CoreError> {
    parse_time_of_day(value).map_err(CoreError::InvalidInput)
}

pub fn category_from_dto(value: &str) -> Result<PointCategory, CoreError> {
    value.parse::<PointCategory>().map_err(CoreError::InvalidInput)
}
