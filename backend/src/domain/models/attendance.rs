//! Attendance records and punctuality classification.
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    OnTime,
    Tardy,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::OnTime => "onTime",
            AttendanceStatus::Tardy => "tardy",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "onTime" => Ok(AttendanceStatus::OnTime),
            "tardy" => Ok(AttendanceStatus::Tardy),
            other => Err(format!("Unknown attendance status: {}", other)),
        }
    }
}

/// Where a check-in falls relative to the session start.
///
/// | minutes from start | window        | status | points |
/// |--------------------|---------------|--------|--------|
/// | < -15              | `BeforeEarly` | onTime | 0      |
/// | -15 ..= -11        | `Early`       | onTime | 1      |
/// | -10 ..= 5          | `Lottery`     | onTime | 1 (2 for the draw winner) |
/// | 6 ..= 15           | `Grace`       | onTime | 0      |
/// | > 15               | `Tardy`       | tardy  | 0      |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInWindow {
    BeforeEarly,
    Early,
    Lottery,
    Grace,
    Tardy,
}

pub const EARLY_FROM_MINUTES: i64 = -15;
pub const LOTTERY_FROM_MINUTES: i64 = -10;
pub const LOTTERY_UNTIL_MINUTES: i64 = 5;
pub const TARDY_AFTER_MINUTES: i64 = 15;

/// Bonus on top of the window award for the draw winner.
pub const LOTTERY_BONUS_POINTS: i64 = 1;

impl CheckInWindow {
    pub fn classify(diff_minutes: i64) -> Self {
        if diff_minutes > TARDY_AFTER_MINUTES {
            CheckInWindow::Tardy
        } else if diff_minutes > LOTTERY_UNTIL_MINUTES {
            CheckInWindow::Grace
        } else if diff_minutes >= LOTTERY_FROM_MINUTES {
            CheckInWindow::Lottery
        } else if diff_minutes >= EARLY_FROM_MINUTES {
            CheckInWindow::Early
        } else {
            CheckInWindow::BeforeEarly
        }
    }

    pub fn status(&self) -> AttendanceStatus {
        match self {
            CheckInWindow::Tardy => AttendanceStatus::Tardy,
            _ => AttendanceStatus::OnTime,
        }
    }

    /// Points credited at check-in time; the draw bonus is credited separately.
    pub fn base_points(&self) -> i64 {
        match self {
            CheckInWindow::Early | CheckInWindow::Lottery => 1,
            CheckInWindow::BeforeEarly | CheckInWindow::Grace | CheckInWindow::Tardy => 0,
        }
    }

    pub fn is_lottery_eligible(&self) -> bool {
        matches!(self, CheckInWindow::Lottery)
    }
}

/// Whole minutes between session start and check-in, rounded down.
pub fn minutes_from_start(now: NaiveDateTime, session_start: NaiveDateTime) -> i64 {
    (now - session_start).num_seconds().div_euclid(60)
}

/// True once the lottery window of the session starting at `session_start` has closed.
pub fn lottery_window_closed(now: NaiveDateTime, session_start: NaiveDateTime) -> bool {
    now > session_start + chrono::Duration::minutes(LOTTERY_UNTIL_MINUTES)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub student_id: String,
    pub student_name: String,
    pub session_time: NaiveTime,
    pub check_in_time: NaiveTime,
    pub status: AttendanceStatus,
}
