//! Check-in processing.
//!
//! A check-in is one storage transaction: the conditional attendance insert
//! (which doubles as the already-marked check), the window award, and the
//! lottery steps. Nothing is written unless all of it commits.
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{info, warn};

use crate::domain::commands::attendance::{
    CheckInCommand, CheckInResult, DaySummary, LotteryOutcome, OverrideTardyCommand,
};
use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::local_clock::LocalClock;
use crate::domain::lottery_service::LotteryService;
use crate::domain::models::attendance::{
    minutes_from_start, AttendanceRecord, AttendanceStatus, CheckInWindow, LOTTERY_BONUS_POINTS,
};
use crate::domain::models::points::PointCategory;
use crate::domain::models::schedule::resolve_schedule;
use crate::domain::models::student::Student;
use crate::domain::session::SessionContext;
use crate::storage::{
    retry_once, AttendanceRepository, DbConnection, LedgerRepository, ScheduleOverrideRepository,
    StudentRepository,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Membership {
    Scheduled,
    NotAttending,
    NoSuchSession,
}

#[derive(Clone)]
pub struct AttendanceService {
    db: DbConnection,
    students: StudentRepository,
    overrides: ScheduleOverrideRepository,
    attendance: AttendanceRepository,
    ledger: LedgerRepository,
    lottery: LotteryService,
    clock: LocalClock,
    tardy_override_code: String,
}

impl AttendanceService {
    pub fn new(
        db: DbConnection,
        lottery: LotteryService,
        clock: LocalClock,
        tardy_override_code: String,
    ) -> Self {
        Self {
            students: StudentRepository::new(db.clone()),
            overrides: ScheduleOverrideRepository::new(db.clone()),
            attendance: AttendanceRepository::new(db.clone()),
            ledger: LedgerRepository::new(db.clone()),
            db,
            lottery,
            clock,
            tardy_override_code,
        }
    }

    /// Validate, classify and record a check-in for today
    pub async fn check_in(
        &self,
        session: &SessionContext,
        command: CheckInCommand,
    ) -> CoreResult<CheckInResult> {
        session.require_open()?;
        info!(
            "Check-in: student={}, session={}",
            command.student_id,
            command.session_time.format("%H:%M")
        );

        let student = self
            .students
            .get_student(&command.student_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Student {}", command.student_id)))?;

        let now = self.clock.now();
        let membership = self
            .membership(&student, now.date(), command.session_time)
            .await?;

        let session_start = now.date().and_time(command.session_time);
        let window = CheckInWindow::classify(minutes_from_start(now, session_start));

        let record = AttendanceRecord {
            date: now.date(),
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            session_time: command.session_time,
            check_in_time: now.time(),
            status: window.status(),
        };

        let (points_awarded, lottery) = retry_once("check-in", || {
            self.record_check_in(&student, &command.secret, membership, &record, window, now)
        })
        .await?;

        info!(
            "{} checked in at {} ({}, {} points)",
            student.name,
            record.check_in_time.format("%H:%M"),
            record.status,
            points_awarded
        );

        let success_message = match record.status {
            AttendanceStatus::OnTime if points_awarded > 1 => {
                format!("{} won today's lucky draw!", student.name)
            }
            AttendanceStatus::OnTime => format!("Welcome, {}!", student.name),
            AttendanceStatus::Tardy => format!("{} checked in late", student.name),
        };

        Ok(CheckInResult {
            record,
            window,
            points_awarded,
            lottery,
            celebrate: points_awarded > 0,
            success_message,
        })
    }

    /// Whether the student is expected at `session_time` on `date`
    async fn membership(
        &self,
        student: &Student,
        date: NaiveDate,
        session_time: NaiveTime,
    ) -> CoreResult<Membership> {
        if !student.is_attending_on(date) {
            return Ok(Membership::NotAttending);
        }
        let overrides = self.overrides.list_for_student(&student.id).await?;
        let scheduled = resolve_schedule(&student.schedules, &overrides, date)
            .iter()
            .any(|slot| slot.weekday == date.weekday() && slot.time == session_time);
        Ok(if scheduled {
            Membership::Scheduled
        } else {
            Membership::NoSuchSession
        })
    }

    /// Rejections run in order: already marked, wrong secret, not in the session.
    /// Each one drops the transaction, so the attendance insert is rolled back.
    async fn record_check_in(
        &self,
        student: &Student,
        secret: &str,
        membership: Membership,
        record: &AttendanceRecord,
        window: CheckInWindow,
        now: NaiveDateTime,
    ) -> CoreResult<(i64, Option<LotteryOutcome>)> {
        let mut tx = self.db.pool().begin().await?;

        if !self.attendance.try_mark(&mut *tx, record).await? {
            return Err(CoreError::AlreadyMarked);
        }

        if secret.trim() != student.birth_secret() {
            warn!("Check-in secret mismatch for {}", student.name);
            return Err(CoreError::IdentityMismatch);
        }

        match membership {
            Membership::Scheduled => {}
            Membership::NotAttending => {
                warn!("{} is inactive or paused on {}", student.name, record.date);
                return Err(CoreError::InvalidState(format!(
                    "{} is not attending classes on {}",
                    student.name, record.date
                )));
            }
            Membership::NoSuchSession => {
                warn!(
                    "{} has no session at {} on {}",
                    student.name,
                    record.session_time.format("%H:%M"),
                    record.date
                );
                return Err(CoreError::InvalidInput(format!(
                    "{} has no session at {} today",
                    student.name,
                    record.session_time.format("%H:%M")
                )));
            }
        }

        let base_points = window.base_points();
        if base_points > 0 {
            self.ledger
                .credit_award(&mut *tx, &student.id, PointCategory::Attendance, base_points)
                .await?;
        }

        let lottery = self
            .lottery
            .on_check_in(&mut *tx, student, window, record.session_time, now)
            .await?;

        tx.commit().await?;

        let won_now = lottery.as_ref().map_or(false, |outcome| {
            outcome.resolved_now
                && outcome
                    .winner
                    .as_ref()
                    .map_or(false, |w| w.student_id == student.id)
        });
        let bonus = if won_now { LOTTERY_BONUS_POINTS } else { 0 };

        Ok((base_points + bonus, lottery))
    }

    /// Turn today's tardy record into on time. Time and points stay as they were.
    pub async fn override_tardy(&self, command: OverrideTardyCommand) -> CoreResult<AttendanceRecord> {
        info!("Tardy override requested for {}", command.student_name);

        if command.admin_secret.trim() != self.tardy_override_code {
            warn!("Wrong tardy override code for {}", command.student_name);
            return Err(CoreError::Unauthorized);
        }

        let today = self.clock.today();
        let promoted = retry_once("tardy override", || {
            self.attendance.promote_tardy(today, &command.student_name)
        })
        .await?;

        if !promoted {
            return Err(CoreError::InvalidState(format!(
                "{} has no tardy record today",
                command.student_name
            )));
        }

        self.attendance
            .get_record(today, &command.student_name)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Attendance for {}", command.student_name)))
    }

    pub async fn day_summary(&self, date: NaiveDate) -> CoreResult<DaySummary> {
        let records = self.attendance.list_for_date(date).await?;
        Ok(DaySummary { date, records })
    }

    pub async fn today_summary(&self) -> CoreResult<DaySummary> {
        self.day_summary(self.clock.today()).await
    }
}
