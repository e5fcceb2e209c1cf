use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::{format_date, parse_stored_date};
use crate::domain::models::redemption::RedemptionEntry;
use crate::storage::DbConnection;

/// Repository for the append-only redemption log
#[derive(Clone)]
pub struct RedemptionRepository {
    db: DbConnection,
}

impl RedemptionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn append(&self, conn: &mut SqliteConnection, entry: &RedemptionEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO redemption_log (id, student_id, student_name, item_name, point, date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.student_id)
        .bind(&entry.student_name)
        .bind(&entry.item_name)
        .bind(entry.point)
        .bind(format_date(entry.date))
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Delete an entry and hand back what it recorded
    pub async fn remove(
        &self,
        conn: &mut SqliteConnection,
        entry_id: &str,
    ) -> Result<Option<RedemptionEntry>> {
        let row = sqlx::query(
            r#"
            DELETE FROM redemption_log
            WHERE id = ?
            RETURNING id, student_id, student_name, item_name, point, date
            "#,
        )
        .bind(entry_id)
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(entry_from_row).transpose()
    }

    /// Full log, newest first
    pub async fn list(&self) -> Result<Vec<RedemptionEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, student_id, student_name, item_name, point, date
            FROM redemption_log
            ORDER BY date DESC, rowid DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(entry_from_row).collect()
    }
}

fn entry_from_row(row: &SqliteRow) -> Result<RedemptionEntry> {
    let date: String = row.get("date");
    Ok(RedemptionEntry {
        id: row.get("id"),
        student_id: row.get("student_id"),
        student_name: row.get("student_name"),
        item_name: row.get("item_name"),
        point: row.get("point"),
        date: parse_stored_date(&date)?,
    })
}
