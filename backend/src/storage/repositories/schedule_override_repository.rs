use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{format_date, parse_stored_date};
use crate::domain::models::schedule::{ScheduleOverride, ScheduleSlot};
use crate::storage::DbConnection;

/// Repository for dated schedule overrides. Rows are never updated.
#[derive(Clone)]
pub struct ScheduleOverrideRepository {
    db: DbConnection,
}

impl ScheduleOverrideRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store an override; false when the student already has one for that date
    pub async fn insert_override(&self, schedule_override: &ScheduleOverride) -> Result<bool> {
        let schedules = serde_json::to_string(&schedule_override.schedules)?;
        let result = sqlx::query(
            r#"
            INSERT INTO schedule_overrides (id, student_id, effective_date, schedules)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(student_id, effective_date) DO NOTHING
            "#,
        )
        .bind(&schedule_override.id)
        .bind(&schedule_override.student_id)
        .bind(format_date(schedule_override.effective_date))
        .bind(&schedules)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Overrides for one student, oldest effective date first
    pub async fn list_for_student(&self, student_id: &str) -> Result<Vec<ScheduleOverride>> {
        let rows = sqlx::query(
            r#"
            SELECT id, student_id, effective_date, schedules
            FROM schedule_overrides
            WHERE student_id = ?
            ORDER BY effective_date ASC
            "#,
        )
        .bind(student_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(override_from_row).collect()
    }

    /// Every override, for resolving a whole roster at once
    pub async fn list_all(&self) -> Result<Vec<ScheduleOverride>> {
        let rows = sqlx::query(
            r#"
            SELECT id, student_id, effective_date, schedules
            FROM schedule_overrides
            ORDER BY student_id ASC, effective_date ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(override_from_row).collect()
    }
}

fn override_from_row(row: &SqliteRow) -> Result<ScheduleOverride> {
    let effective_date: String = row.get("effective_date");
    let schedules: String = row.get("schedules");
    Ok(ScheduleOverride {
        id: row.get("id"),
        student_id: row.get("student_id"),
        effective_date: parse_stored_date(&effective_date)?,
        schedules: serde_json::from_str::<Vec<ScheduleSlot>>(&schedules)?,
    })
}
