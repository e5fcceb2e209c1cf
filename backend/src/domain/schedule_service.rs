use chrono::{Datelike, NaiveDate, NaiveTime};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

use crate::domain::commands::schedule::{
    CreateOverrideCommand, RosterEntry, SessionGroup, SessionRoster,
};
use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::local_clock::LocalClock;
use crate::domain::models::schedule::{resolve_schedule, ScheduleOverride, ScheduleSlot};
use crate::domain::models::student::Student;
use crate::domain::session::SessionContext;
use crate::storage::{AttendanceRepository, ScheduleOverrideRepository, StudentRepository};

/// Resolves effective schedules and builds the per-session roster
#[derive(Clone)]
pub struct ScheduleService {
    students: StudentRepository,
    overrides: ScheduleOverrideRepository,
    attendance: AttendanceRepository,
    clock: LocalClock,
}

impl ScheduleService {
    pub fn new(
        students: StudentRepository,
        overrides: ScheduleOverrideRepository,
        attendance: AttendanceRepository,
        clock: LocalClock,
    ) -> Self {
        Self {
            students,
            overrides,
            attendance,
            clock,
        }
    }

    /// The weekly schedule in force for a student on `date`
    pub async fn effective_schedule(
        &self,
        student_id: &str,
        date: NaiveDate,
    ) -> CoreResult<Vec<ScheduleSlot>> {
        let student = self
            .students
            .get_student(student_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Student {}", student_id)))?;
        let overrides = self.overrides.list_for_student(student_id).await?;
        Ok(resolve_schedule(&student.schedules, &overrides, date).to_vec())
    }

    pub async fn create_override(
        &self,
        session: &SessionContext,
        command: CreateOverrideCommand,
    ) -> CoreResult<ScheduleOverride> {
        session.require_open()?;
        info!(
            "Creating schedule override: student={}, effective={}",
            command.student_id, command.effective_date
        );

        if self.students.get_student(&command.student_id).await?.is_none() {
            return Err(CoreError::NotFound(format!("Student {}", command.student_id)));
        }

        let schedule_override = ScheduleOverride {
            id: ScheduleOverride::generate_id(),
            student_id: command.student_id,
            effective_date: command.effective_date,
            schedules: command.schedules,
        };

        if !self.overrides.insert_override(&schedule_override).await? {
            warn!(
                "Override already exists for {} on {}",
                schedule_override.student_id, schedule_override.effective_date
            );
            return Err(CoreError::InvalidInput(format!(
                "An override effective {} already exists for this student",
                schedule_override.effective_date
            )));
        }

        Ok(schedule_override)
    }

    /// Students expected on `date`, grouped by session time, with today's check-ins
    pub async fn sessions_on(&self, date: NaiveDate) -> CoreResult<SessionRoster> {
        let students = self.students.list_students().await?;
        let overrides = self.overrides.list_all().await?;

        let checked_in: HashMap<String, NaiveTime> = self
            .attendance
            .list_for_date(date)
            .await?
            .into_iter()
            .map(|record| (record.student_name, record.check_in_time))
            .collect();

        let mut sessions = group_sessions(&students, &overrides, date);
        for group in &mut sessions {
            for entry in &mut group.students {
                entry.checked_in_at = checked_in.get(&entry.name).copied();
            }
        }

        Ok(SessionRoster {
            date,
            weekday: date.weekday(),
            sessions,
        })
    }

    pub async fn sessions_today(&self) -> CoreResult<SessionRoster> {
        self.sessions_on(self.clock.today()).await
    }
}

/// Group attending students by the start times of their slots on `date`'s weekday.
///
/// Students must be sorted by name; groups come out in ascending time order.
pub fn group_sessions(
    students: &[Student],
    overrides: &[ScheduleOverride],
    date: NaiveDate,
) -> Vec<SessionGroup> {
    let mut by_student: HashMap<&str, Vec<ScheduleOverride>> = HashMap::new();
    for o in overrides {
        by_student.entry(o.student_id.as_str()).or_default().push(o.clone());
    }

    let mut groups: BTreeMap<NaiveTime, Vec<RosterEntry>> = BTreeMap::new();
    for student in students.iter().filter(|s| s.is_attending_on(date)) {
        let student_overrides = by_student
            .get(student.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let schedule = resolve_schedule(&student.schedules, student_overrides, date);

        for slot in schedule.iter().filter(|slot| slot.weekday == date.weekday()) {
            let entries = groups.entry(slot.time).or_default();
            if entries.iter().all(|e| e.student_id != student.id) {
                entries.push(RosterEntry {
                    student_id: student.id.clone(),
                    name: student.name.clone(),
                    checked_in_at: None,
                });
            }
        }
    }

    groups
        .into_iter()
        .map(|(time, students)| SessionGroup { time, students })
        .collect()
}
