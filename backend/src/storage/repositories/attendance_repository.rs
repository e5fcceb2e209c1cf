use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::{format_date, format_time, parse_stored_date, parse_stored_time};
use crate::domain::models::attendance::{AttendanceRecord, AttendanceStatus};
use crate::storage::DbConnection;

/// Repository for per-day attendance records
#[derive(Clone)]
pub struct AttendanceRepository {
    db: DbConnection,
}

impl AttendanceRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Record a check-in unless the student already has one that day.
    ///
    /// The insert is the already-marked check; false means nothing was written.
    pub async fn try_mark(
        &self,
        conn: &mut SqliteConnection,
        record: &AttendanceRecord,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (date, student_name, student_id, session_time, check_in_time, status)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(date, student_name) DO NOTHING
            "#,
        )
        .bind(format_date(record.date))
        .bind(&record.student_name)
        .bind(&record.student_id)
        .bind(format_time(record.session_time))
        .bind(format_time(record.check_in_time))
        .bind(record.status.as_str())
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Flip a tardy record to on time; false when there is no tardy record
    pub async fn promote_tardy(&self, date: NaiveDate, student_name: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET status = 'onTime'
            WHERE date = ? AND student_name = ? AND status = 'tardy'
            "#,
        )
        .bind(format_date(date))
        .bind(student_name)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn get_record(
        &self,
        date: NaiveDate,
        student_name: &str,
    ) -> Result<Option<AttendanceRecord>> {
        let row = sqlx::query(
            r#"
            SELECT date, student_name, student_id, session_time, check_in_time, status
            FROM attendance
            WHERE date = ? AND student_name = ?
            "#,
        )
        .bind(format_date(date))
        .bind(student_name)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    /// All records of a day in check-in order
    pub async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT date, student_name, student_id, session_time, check_in_time, status
            FROM attendance
            WHERE date = ?
            ORDER BY check_in_time ASC, student_name ASC
            "#,
        )
        .bind(format_date(date))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(record_from_row).collect()
    }
}

fn record_from_row(row: &SqliteRow) -> Result<AttendanceRecord> {
    let date: String = row.get("date");
    let session_time: String = row.get("session_time");
    let check_in_time: String = row.get("check_in_time");
    let status: String = row.get("status");
    Ok(AttendanceRecord {
        date: parse_stored_date(&date)?,
        student_id: row.get("student_id"),
        student_name: row.get("student_name"),
        session_time: parse_stored_time(&session_time)?,
        check_in_time: parse_stored_time(&check_in_time)?,
        status: status.parse::<AttendanceStatus>().map_err(|e| anyhow!(e))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, time};

    fn record(name: &str, check_in: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            date: date("2025-03-03"),
            student_id: format!("student::{}", name),
            student_name: name.to_string(),
            session_time: time("14:00"),
            check_in_time: time(check_in),
            status,
        }
    }

    #[tokio::test]
    async fn test_second_mark_same_day_is_rejected() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let repo = AttendanceRepository::new(db.clone());
        let mut conn = db.pool().acquire().await.unwrap();

        let first = record("Minji", "13:55", AttendanceStatus::OnTime);
        let again = record("Minji", "14:30", AttendanceStatus::Tardy);
        assert!(repo.try_mark(&mut conn, &first).await.unwrap());
        assert!(!repo.try_mark(&mut conn, &again).await.unwrap());
        drop(conn);

        let stored = repo
            .get_record(first.date, "Minji")
            .await
            .unwrap()
            .expect("Record missing");
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn test_promote_tardy_only_changes_tardy_records() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let repo = AttendanceRepository::new(db.clone());
        let mut conn = db.pool().acquire().await.unwrap();
        repo.try_mark(&mut conn, &record("Late", "14:20", AttendanceStatus::Tardy))
            .await
            .unwrap();
        repo.try_mark(&mut conn, &record("Early", "13:50", AttendanceStatus::OnTime))
            .await
            .unwrap();
        drop(conn);

        let day = date("2025-03-03");
        assert!(repo.promote_tardy(day, "Late").await.unwrap());
        assert!(!repo.promote_tardy(day, "Late").await.unwrap());
        assert!(!repo.promote_tardy(day, "Early").await.unwrap());
        assert!(!repo.promote_tardy(day, "Nobody").await.unwrap());

        let late = repo.get_record(day, "Late").await.unwrap().unwrap();
        assert_eq!(late.status, AttendanceStatus::OnTime);
        assert_eq!(late.check_in_time, time("14:20"));

        let listed: Vec<String> = repo
            .list_for_date(day)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.student_name)
            .collect();
        assert_eq!(listed, vec!["Early", "Late"]);
    }
}
