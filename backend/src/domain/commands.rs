//! Domain-level command and result types.
//!
//! Services take and return these; they are not exposed over the public API.
//! The REST layer maps the `shared` DTOs to and from them, parsing dates,
//! times and categories on the way in.

pub mod students {
    use crate::domain::models::student::Student;

    /// Result of a legacy document import.
    #[derive(Debug, Clone)]
    pub struct ImportStudentsResult {
        pub imported: Vec<Student>,
        /// Names (or positions) of documents that were not imported, with the reason
        pub skipped: Vec<String>,
    }
}

pub mod schedule {
    use chrono::{NaiveDate, NaiveTime, Weekday};

    use crate::domain::models::schedule::ScheduleSlot;

    #[derive(Debug, Clone)]
    pub struct CreateOverrideCommand {
        pub student_id: String,
        pub effective_date: NaiveDate,
        pub schedules: Vec<ScheduleSlot>,
    }

    /// One student expected at a session.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RosterEntry {
        pub student_id: String,
        pub name: String,
        pub checked_in_at: Option<NaiveTime>,
    }

    /// Students sharing a session start time.
    #[derive(Debug, Clone, PartialEq)]
    pub struct SessionGroup {
        pub time: NaiveTime,
        pub students: Vec<RosterEntry>,
    }

    #[derive(Debug, Clone)]
    pub struct SessionRoster {
        pub date: NaiveDate,
        pub weekday: Weekday,
        pub sessions: Vec<SessionGroup>,
    }
}

pub mod attendance {
    use chrono::{NaiveDate, NaiveTime};

    use crate::domain::models::attendance::{AttendanceRecord, CheckInWindow};
    use crate::domain::models::lottery::LotteryWinner;

    #[derive(Debug, Clone)]
    pub struct CheckInCommand {
        pub student_id: String,
        pub session_time: NaiveTime,
        pub secret: String,
    }

    /// Lottery side of a check-in.
    #[derive(Debug, Clone, PartialEq)]
    pub struct LotteryOutcome {
        pub lottery_key: String,
        /// Whether this check-in entered the draw
        pub candidate: bool,
        pub winner: Option<LotteryWinner>,
        /// The winner was committed by this check-in
        pub resolved_now: bool,
    }

    #[derive(Debug, Clone)]
    pub struct CheckInResult {
        pub record: AttendanceRecord,
        pub window: CheckInWindow,
        pub points_awarded: i64,
        pub lottery: Option<LotteryOutcome>,
        /// Signal for the desk's one-off celebration animation
        pub celebrate: bool,
        pub success_message: String,
    }

    #[derive(Debug, Clone)]
    pub struct OverrideTardyCommand {
        pub student_name: String,
        pub admin_secret: String,
    }

    #[derive(Debug, Clone)]
    pub struct DaySummary {
        pub date: NaiveDate,
        pub records: Vec<AttendanceRecord>,
    }
}

pub mod lottery {
    use chrono::NaiveTime;

    #[derive(Debug, Clone)]
    pub struct ResolveLotteryCommand {
        pub lottery_key: String,
        pub session_time: NaiveTime,
    }
}

pub mod ledger {
    use crate::domain::models::points::{PointCategory, PointMap};

    #[derive(Debug, Clone)]
    pub struct AdjustPointsCommand {
        pub student_id: String,
        pub category: PointCategory,
        pub delta: i64,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct AdjustPointsResult {
        pub student_id: String,
        pub category: PointCategory,
        pub value: i64,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Balance {
        pub student_id: String,
        pub student_name: String,
        pub points: PointMap,
        pub total: i64,
        pub spendable: i64,
    }
}

pub mod ranking {
    /// Every student sharing one of the top distinct values.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RankGroup {
        /// 1-based slot
        pub rank: usize,
        pub value: i64,
        /// Alphabetical
        pub names: Vec<String>,
    }
}

pub mod redemption {
    use crate::domain::models::redemption::RedemptionEntry;

    #[derive(Debug, Clone)]
    pub struct RedeemCommand {
        pub code: String,
        pub item_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct RedeemResult {
        pub entry: RedemptionEntry,
        pub remaining_points: i64,
        pub success_message: String,
    }

    #[derive(Debug, Clone)]
    pub struct ReverseRedemptionCommand {
        pub entry_id: String,
        pub admin_secret: String,
    }

    #[derive(Debug, Clone)]
    pub struct ReverseRedemptionResult {
        pub entry: RedemptionEntry,
        pub spendable_points: i64,
        pub success_message: String,
    }

    #[derive(Debug, Clone)]
    pub struct CreateShopItemCommand {
        pub name: String,
        pub cost: i64,
        pub image_url: Option<String>,
        pub admin_secret: String,
    }
}
