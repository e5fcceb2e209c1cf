use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One weekly class slot. `weekday` is an English day name ("Mon", "Tuesday", ...)
/// and `time` is a 24h "HH:MM" string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub weekday: String,
    pub time: String,
}

/// Student as exposed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    /// Birth date (YYYY-MM-DD)
    pub birth: String,
    pub guardian_phone: String,
    pub schedules: Vec<ScheduleSlot>,
    pub points: BTreeMap<String, i64>,
    pub spendable_points: i64,
    pub active: bool,
    /// Date (YYYY-MM-DD) from which the student is paused
    pub pause_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub birth: String,
    pub guardian_phone: String,
    #[serde(default)]
    pub schedules: Vec<ScheduleSlot>,
    #[serde(default)]
    pub points: BTreeMap<String, i64>,
    pub pause_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResponse {
    pub student: Student,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentListResponse {
    pub students: Vec<Student>,
}

/// Result of importing legacy student documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportStudentsResponse {
    pub imported: usize,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateScheduleOverrideRequest {
    pub student_id: String,
    /// Effective date (YYYY-MM-DD)
    pub effective_date: String,
    pub schedules: Vec<ScheduleSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOverrideResponse {
    pub id: String,
    pub student_id: String,
    pub effective_date: String,
    pub schedules: Vec<ScheduleSlot>,
}

/// Students expected at one session time today
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionGroup {
    pub time: String,
    pub students: Vec<RosterEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub student_id: String,
    pub name: String,
    /// Check-in time if already marked today
    pub checked_in_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRosterResponse {
    pub date: String,
    pub weekday: String,
    pub sessions: Vec<SessionGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttendanceStatus {
    OnTime,
    Tardy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub student_id: String,
    /// Session start time ("HH:MM")
    pub session_time: String,
    /// Last four digits of the birth date
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub student_name: String,
    pub status: AttendanceStatus,
    pub check_in_time: String,
    pub points_awarded: i64,
    pub lottery_candidate: bool,
    pub lottery_winner: Option<String>,
    /// Hint for the UI to play the check-in animation
    pub celebrate: bool,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideTardyRequest {
    pub student_name: String,
    pub admin_secret: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideTardyResponse {
    pub student_name: String,
    pub status: AttendanceStatus,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub student_name: String,
    pub session_time: String,
    pub check_in_time: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummaryResponse {
    pub date: String,
    pub total: usize,
    pub entries: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotteryStateResponse {
    pub lottery_key: String,
    pub candidates: Vec<String>,
    pub winner_name: Option<String>,
    pub winner_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveLotteryRequest {
    pub lottery_key: String,
    /// Session start time ("HH:MM") whose window must have closed
    pub session_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustPointsRequest {
    pub student_id: String,
    pub category: String,
    pub delta: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustPointsResponse {
    pub student_id: String,
    pub category: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub student_id: String,
    pub student_name: String,
    pub points: BTreeMap<String, i64>,
    pub total: i64,
    pub spendable_points: i64,
}

/// One rank slot; all students sharing `value` are listed together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankGroup {
    pub rank: usize,
    pub value: i64,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResponse {
    pub category: String,
    pub groups: Vec<RankGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: String,
    pub name: String,
    pub cost: i64,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateShopItemRequest {
    pub name: String,
    pub cost: i64,
    pub image_url: Option<String>,
    pub admin_secret: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItemListResponse {
    pub items: Vec<ShopItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemRequest {
    /// Last four digits of birth date followed by last four digits of guardian phone
    pub code: String,
    pub item_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionLogEntry {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub item_name: String,
    pub point: i64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemResponse {
    pub entry: RedemptionLogEntry,
    pub remaining_points: i64,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseRedemptionRequest {
    pub admin_secret: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseRedemptionResponse {
    pub entry_id: String,
    pub restored_points: i64,
    pub spendable_points: i64,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionLogResponse {
    pub entries: Vec<RedemptionLogEntry>,
}

/// Error body returned by every endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
