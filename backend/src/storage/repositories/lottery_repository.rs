use anyhow::Result;
use chrono::NaiveTime;
use sqlx::{Row, SqliteConnection};

use super::{format_time, parse_stored_time};
use crate::domain::models::lottery::{LotteryCandidate, LotteryState, LotteryWinner};
use crate::storage::DbConnection;

/// Repository for lottery candidates and the write-once winner
#[derive(Clone)]
pub struct LotteryRepository {
    db: DbConnection,
}

impl LotteryRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Make sure a lottery row exists for `lottery_key`.
    ///
    /// Also used to take the write lock at the start of a resolution transaction.
    pub async fn ensure_lottery(&self, conn: &mut SqliteConnection, lottery_key: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO lottery (lottery_key) VALUES (?)")
            .bind(lottery_key)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Append a candidate in check-in order; false if already a candidate
    pub async fn add_candidate(
        &self,
        conn: &mut SqliteConnection,
        lottery_key: &str,
        candidate: &LotteryCandidate,
        checked_in_at: NaiveTime,
    ) -> Result<bool> {
        self.ensure_lottery(conn, lottery_key).await?;

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO lottery_candidates (lottery_key, student_id, student_name, seq, checked_in_at)
            VALUES (?, ?, ?,
                (SELECT COALESCE(MAX(seq), 0) + 1 FROM lottery_candidates WHERE lottery_key = ?),
                ?)
            "#,
        )
        .bind(lottery_key)
        .bind(&candidate.student_id)
        .bind(&candidate.student_name)
        .bind(lottery_key)
        .bind(format_time(checked_in_at))
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn load_state(
        &self,
        conn: &mut SqliteConnection,
        lottery_key: &str,
    ) -> Result<LotteryState> {
        let candidates = sqlx::query(
            r#"
            SELECT student_id, student_name
            FROM lottery_candidates
            WHERE lottery_key = ?
            ORDER BY seq ASC
            "#,
        )
        .bind(lottery_key)
        .fetch_all(&mut *conn)
        .await?
        .iter()
        .map(|row| LotteryCandidate {
            student_id: row.get("student_id"),
            student_name: row.get("student_name"),
        })
        .collect();

        let winner_row = sqlx::query(
            r#"
            SELECT winner_student_id, winner_name, winner_time
            FROM lottery
            WHERE lottery_key = ? AND winner_name IS NOT NULL
            "#,
        )
        .bind(lottery_key)
        .fetch_optional(&mut *conn)
        .await?;

        let winner = match winner_row {
            Some(row) => {
                let time: String = row.get("winner_time");
                Some(LotteryWinner {
                    student_id: row.get("winner_student_id"),
                    student_name: row.get("winner_name"),
                    time: parse_stored_time(&time)?,
                })
            }
            None => None,
        };

        Ok(LotteryState {
            lottery_key: lottery_key.to_string(),
            candidates,
            winner,
        })
    }

    /// Set the winner if none is set yet. False means another resolver got there first.
    pub async fn commit_winner(
        &self,
        conn: &mut SqliteConnection,
        lottery_key: &str,
        winner: &LotteryWinner,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE lottery
            SET winner_student_id = ?, winner_name = ?, winner_time = ?
            WHERE lottery_key = ? AND winner_name IS NULL
            "#,
        )
        .bind(&winner.student_id)
        .bind(&winner.student_name)
        .bind(format_time(winner.time))
        .bind(lottery_key)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Current state outside any transaction
    pub async fn state(&self, lottery_key: &str) -> Result<LotteryState> {
        let mut conn = self.db.pool().acquire().await?;
        self.load_state(&mut conn, lottery_key).await
    }
}
