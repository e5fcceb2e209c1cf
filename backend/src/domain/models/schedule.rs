//! Weekly schedule slots and dated schedule overrides.
use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A weekly class slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub weekday: Weekday,
    pub time: NaiveTime,
}

impl ScheduleSlot {
    pub fn parse(weekday: &str, time: &str) -> Result<Self, String> {
        Ok(Self {
            weekday: parse_weekday(weekday)?,
            time: parse_time_of_day(time)?,
        })
    }
}

/// A dated replacement of a student's weekly schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOverride {
    pub id: String,
    pub student_id: String,
    pub effective_date: NaiveDate,
    pub schedules: Vec<ScheduleSlot>,
}

impl ScheduleOverride {
    pub fn generate_id() -> String {
        format!("override::{}", uuid::Uuid::new_v4())
    }
}

/// Accepts English names ("Mon", "monday") and the single-character Korean
/// day names used by the legacy documents.
pub fn parse_weekday(value: &str) -> Result<Weekday, String> {
    let value = value.trim();
    let korean = match value {
        "일" => Some(Weekday::Sun),
        "월" => Some(Weekday::Mon),
        "화" => Some(Weekday::Tue),
        "수" => Some(Weekday::Wed),
        "목" => Some(Weekday::Thu),
        "금" => Some(Weekday::Fri),
        "토" => Some(Weekday::Sat),
        _ => None,
    };
    match korean {
        Some(day) => Ok(day),
        None => value
            .parse::<Weekday>()
            .map_err(|_| format!("Invalid weekday: {}", value)),
    }
}

/// Parse a 24h "HH:MM" (or "HH:MM:SS") time of day.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, String> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("Invalid time of day (expected HH:MM): {}", value))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date (expected YYYY-MM-DD): {}", value))
}

/// The schedule in force on `date`: the override with the latest effective
/// date not after `date`, otherwise the base schedule.
pub fn resolve_schedule<'a>(
    base: &'a [ScheduleSlot],
    overrides: &'a [ScheduleOverride],
    date: NaiveDate,
) -> &'a [ScheduleSlot] {
    overrides
        .iter()
        .filter(|o| o.effective_date <= date)
        .max_by_key(|o| o.effective_date)
        .map(|o| o.schedules.as_slice())
        .unwrap_or(base)
}
