use shared::{
    AttendanceEntry, AttendanceStatus as AttendanceStatusDto, AttendanceSummaryResponse,
    CheckInRequest, CheckInResponse, OverrideTardyRequest, OverrideTardyResponse,
};

use super::{date_to_dto, time_from_dto, time_to_dto};
use crate::domain::commands::attendance::{
    CheckInCommand, CheckInResult, DaySummary, OverrideTardyCommand,
};
use crate::domain::models::attendance::{AttendanceRecord, AttendanceStatus};
use crate::domain::CoreError;

pub struct AttendanceMapper;

impl AttendanceMapper {
    pub fn status_to_dto(status: AttendanceStatus) -> AttendanceStatusDto {
        match status {
            AttendanceStatus::OnTime => AttendanceStatusDto::OnTime,
            AttendanceStatus::Tardy => AttendanceStatusDto::Tardy,
        }
    }

    pub fn check_in_command(request: CheckInRequest) -> Result<CheckInCommand, CoreError> {
        Ok(CheckInCommand {
            session_time: time_from_dto(&request.session_time)?,
            student_id: request.student_id,
            secret: request.secret,
        })
    }

    pub fn check_in_to_dto(result: CheckInResult) -> CheckInResponse {
        let (lottery_candidate, lottery_winner) = match result.lottery {
            Some(outcome) => (outcome.candidate, outcome.winner.map(|w| w.student_name)),
            None => (false, None),
        };

        CheckInResponse {
            student_name: result.record.student_name,
            status: Self::status_to_dto(result.record.status),
            check_in_time: time_to_dto(result.record.check_in_time),
            points_awarded: result.points_awarded,
            lottery_candidate,
            lottery_winner,
            celebrate: result.celebrate,
            success_message: result.success_message,
        }
    }

    pub fn override_command(request: OverrideTardyRequest) -> OverrideTardyCommand {
        OverrideTardyCommand {
            student_name: request.student_name.trim().to_string(),
            admin_secret: request.admin_secret,
        }
    }

    pub fn override_to_dto(record: AttendanceRecord) -> OverrideTardyResponse {
        OverrideTardyResponse {
            success_message: format!("{} marked on time", record.student_name),
            status: Self::status_to_dto(record.status),
            student_name: record.student_name,
        }
    }

    pub fn summary_to_dto(summary: DaySummary) -> AttendanceSummaryResponse {
        AttendanceSummaryResponse {
            date: date_to_dto(summary.date),
            total: summary.records.len(),
            entries: summary
                .records
                .into_iter()
                .map(|record| AttendanceEntry {
                    session_time: time_to_dto(record.session_time),
                    check_in_time: time_to_dto(record.check_in_time),
                    status: Self::status_to_dto(record.status),
                    student_name: record.student_name,
                })
                .collect(),
        }
    }
}
