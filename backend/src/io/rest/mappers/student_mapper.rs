use std::collections::BTreeMap;

use shared::{
    CreateScheduleOverrideRequest, CreateStudentRequest, RosterEntry as RosterEntryDto,
    ScheduleOverrideResponse, ScheduleSlot as ScheduleSlotDto, SessionGroup as SessionGroupDto,
    SessionRosterResponse, Student as StudentDto,
};

use super::{category_from_dto, date_from_dto, date_to_dto, time_to_dto};
use crate::domain::commands::schedule::{CreateOverrideCommand, SessionRoster};
use crate::domain::models::points::PointMap;
use crate::domain::models::schedule::{ScheduleOverride, ScheduleSlot};
use crate::domain::models::student::{NewStudent, Student};
use crate::domain::CoreError;

pub struct StudentMapper;

impl StudentMapper {
    pub fn slot_to_dto(slot: &ScheduleSlot) -> ScheduleSlotDto {
        ScheduleSlotDto {
            weekday: slot.weekday.to_string(),
            time: time_to_dto(slot.time),
        }
    }

    pub fn slots_from_dto(slots: &[ScheduleSlotDto]) -> Result<Vec<ScheduleSlot>, CoreError> {
        slots
            .iter()
            .map(|s| ScheduleSlot::parse(&s.weekday, &s.time).map_err(CoreError::InvalidInput))
            .collect()
    }

    pub fn points_to_dto(points: &PointMap) -> BTreeMap<String, i64> {
        points
            .iter()
            .map(|(category, value)| (category.to_string(), value))
            .collect()
    }

    pub fn to_dto(student: Student) -> StudentDto {
        StudentDto {
            schedules: student.schedules.iter().map(Self::slot_to_dto).collect(),
            points: Self::points_to_dto(&student.points),
            birth: date_to_dto(student.birth),
            pause_date: student.pause_date.map(date_to_dto),
            id: student.id,
            name: student.name,
            guardian_phone: student.guardian_phone,
            spendable_points: student.spendable_points,
            active: student.active,
        }
    }

    pub fn to_dto_list(students: Vec<Student>) -> Vec<StudentDto> {
        students.into_iter().map(Self::to_dto).collect()
    }

    /// New students start active; spendable defaults to the point total
    pub fn new_student_from_request(request: CreateStudentRequest) -> Result<NewStudent, CoreError> {
        let mut points = Vec::with_capacity(request.points.len());
        for (category, value) in &request.points {
            points.push((category_from_dto(category)?, *value));
        }

        Ok(NewStudent {
            name: request.name.trim().to_string(),
            birth: date_from_dto(&request.birth)?,
            guardian_phone: request.guardian_phone.trim().to_string(),
            schedules: Self::slots_from_dto(&request.schedules)?,
            points: PointMap::from_partial(points),
            spendable_points: None,
            active: true,
            pause_date: request.pause_date.as_deref().map(date_from_dto).transpose()?,
        })
    }

    pub fn override_command_from_request(
        request: CreateScheduleOverrideRequest,
    ) -> Result<CreateOverrideCommand, CoreError> {
        Ok(CreateOverrideCommand {
            effective_date: date_from_dto(&request.effective_date)?,
            schedules: Self::slots_from_dto(&request.schedules)?,
            student_id: request.student_id,
        })
    }

    pub fn override_to_dto(schedule_override: ScheduleOverride) -> ScheduleOverrideResponse {
        ScheduleOverrideResponse {
            effective_date: date_to_dto(schedule_override.effective_date),
            schedules: schedule_override.schedules.iter().map(Self::slot_to_dto).collect(),
            id: schedule_override.id,
            student_id: schedule_override.student_id,
        }
    }

    pub fn roster_to_dto(roster: SessionRoster) -> SessionRosterResponse {
        SessionRosterResponse {
            date: date_to_dto(roster.date),
            weekday: roster.weekday.to_string(),
            sessions: roster
                .sessions
                .into_iter()
                .map(|group| SessionGroupDto {
                    time: time_to_dto(group.time),
                    students: group
                        .students
                        .into_iter()
                        .map(|entry| RosterEntryDto {
                            student_id: entry.student_id,
                            name: entry.name,
                            checked_in_at: entry.checked_in_at.map(time_to_dto),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
