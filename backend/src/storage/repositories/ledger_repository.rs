use anyhow::{bail, Result};
use sqlx::SqliteConnection;

use crate::domain::models::points::PointCategory;
use crate::storage::DbConnection;

/// Repository for category points and the spendable balance.
///
/// Every method is a single atomic statement (or a pair inside the caller's
/// transaction); balances are never read, modified and written back.
#[derive(Clone)]
pub struct LedgerRepository {
    db: DbConnection,
}

impl LedgerRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Credit earned points to a category and to the spendable balance
    pub async fn credit_award(
        &self,
        conn: &mut SqliteConnection,
        student_id: &str,
        category: PointCategory,
        amount: i64,
    ) -> Result<()> {
        let points = sqlx::query(
            r#"
            UPDATE student_points
            SET value = value + ?
            WHERE student_id = ? AND category = ?
            "#,
        )
        .bind(amount)
        .bind(student_id)
        .bind(category.as_str())
        .execute(&mut *conn)
        .await?;

        if points.rows_affected() != 1 {
            bail!("No {} points row for student {}", category, student_id);
        }

        let balance = sqlx::query(
            r#"
            UPDATE students
            SET spendable_points = COALESCE(spendable_points, 0) + ?
            WHERE id = ?
            "#,
        )
        .bind(amount)
        .bind(student_id)
        .execute(&mut *conn)
        .await?;

        if balance.rows_affected() != 1 {
            bail!("Student not found: {}", student_id);
        }
        Ok(())
    }

    /// Add `delta` to a category, flooring at zero. None when the row does not exist.
    pub async fn adjust(
        &self,
        student_id: &str,
        category: PointCategory,
        delta: i64,
    ) -> Result<Option<i64>> {
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE student_points
            SET value = MAX(value + ?, 0)
            WHERE student_id = ? AND category = ?
            RETURNING value
            "#,
        )
        .bind(delta)
        .bind(student_id)
        .bind(category.as_str())
        .fetch_optional(self.db.pool())
        .await?;
        Ok(value)
    }

    /// Take `amount` off the spendable balance only if it covers it
    pub async fn try_debit(
        &self,
        conn: &mut SqliteConnection,
        student_id: &str,
        amount: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE students
            SET spendable_points = spendable_points - ?
            WHERE id = ? AND spendable_points >= ?
            "#,
        )
        .bind(amount)
        .bind(student_id)
        .bind(amount)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Give `amount` back to the spendable balance, returning the new balance
    pub async fn credit_spendable(
        &self,
        conn: &mut SqliteConnection,
        student_id: &str,
        amount: i64,
    ) -> Result<Option<i64>> {
        let balance = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE students
            SET spendable_points = COALESCE(spendable_points, 0) + ?
            WHERE id = ?
            RETURNING spendable_points
            "#,
        )
        .bind(amount)
        .bind(student_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(balance)
    }

    pub async fn spendable(
        &self,
        conn: &mut SqliteConnection,
        student_id: &str,
    ) -> Result<Option<i64>> {
        let balance = sqlx::query_scalar::<_, Option<i64>>(
            "SELECT spendable_points FROM students WHERE id = ?",
        )
        .bind(student_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(balance.flatten())
    }
}
