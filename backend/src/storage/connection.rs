use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::migration;

// The database URL for the production database
pub const DATABASE_URL: &str = "sqlite:attendance.db";

const RETRY_DELAY: Duration = Duration::from_millis(50);

/// Pool tuning for a connection
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub busy_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str, settings: &PoolSettings) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(settings.busy_timeout)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_with(options)
            .await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        // One-time data migrations, never repeated on the read path
        let backfilled = migration::backfill_spendable_balances(&pool).await?;
        if backfilled > 0 {
            info!("Backfilled spendable balance for {} students", backfilled);
        }

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("sqlite:file:memdb_{}?mode=memory&cache=shared", test_id);

        let settings = PoolSettings {
            max_connections: 1,
            ..PoolSettings::default()
        };
        Self::new(&db_url, &settings).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // spendable_points is nullable only for legacy rows awaiting backfill
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS students (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                birth TEXT NOT NULL,
                guardian_phone TEXT NOT NULL,
                schedules TEXT NOT NULL DEFAULT '[]',
                spendable_points INTEGER CHECK (spendable_points IS NULL OR spendable_points >= 0),
                active BOOLEAN NOT NULL DEFAULT TRUE,
                pause_date TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS student_points (
                student_id TEXT NOT NULL,
                category TEXT NOT NULL,
                value INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (student_id, category),
                FOREIGN KEY (student_id) REFERENCES students (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schedule_overrides (
                id TEXT PRIMARY KEY,
                student_id TEXT NOT NULL,
                effective_date TEXT NOT NULL,
                schedules TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (student_id, effective_date),
                FOREIGN KEY (student_id) REFERENCES students (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS attendance (
                date TEXT NOT NULL,
                student_name TEXT NOT NULL,
                student_id TEXT NOT NULL,
                session_time TEXT NOT NULL,
                check_in_time TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('onTime', 'tardy')),
                PRIMARY KEY (date, student_name)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS lottery (
                lottery_key TEXT PRIMARY KEY,
                winner_student_id TEXT,
                winner_name TEXT,
                winner_time TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS lottery_candidates (
                lottery_key TEXT NOT NULL,
                student_id TEXT NOT NULL,
                student_name TEXT NOT NULL,
                seq INTEGER NOT NULL,
                checked_in_at TEXT NOT NULL,
                PRIMARY KEY (lottery_key, student_id),
                FOREIGN KEY (lottery_key) REFERENCES lottery (lottery_key) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS shop_items (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                cost INTEGER NOT NULL CHECK (cost > 0),
                image_url TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS redemption_log (
                id TEXT PRIMARY KEY,
                student_id TEXT NOT NULL,
                student_name TEXT NOT NULL,
                item_name TEXT NOT NULL,
                point INTEGER NOT NULL CHECK (point > 0),
                date TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Create index for listing today's attendance in check-in order
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_attendance_date_time
            ON attendance(date, check_in_time);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

/// Errors that can tell whether a second attempt might succeed.
pub trait RetryableError {
    fn is_transient(&self) -> bool;
}

/// Busy/locked database, I/O faults and pool exhaustion are worth one retry.
pub fn is_transient_sqlx(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db_err) => matches!(
            db_err.code().as_deref(),
            // SQLITE_BUSY, SQLITE_LOCKED and their extended codes
            Some("5") | Some("6") | Some("261") | Some("262") | Some("517")
        ),
        _ => false,
    }
}

impl RetryableError for anyhow::Error {
    fn is_transient(&self) -> bool {
        self.chain()
            .any(|cause| cause.downcast_ref::<sqlx::Error>().map_or(false, is_transient_sqlx))
    }
}

/// Run `operation`, repeating it once if the first attempt failed transiently.
///
/// Operations passed here must be whole transactions (or single statements)
/// so that a failed first attempt leaves nothing behind.
pub async fn retry_once<T, E, F, Fut>(label: &str, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + std::fmt::Display,
{
    match operation().await {
        Err(err) if err.is_transient() => {
            warn!("{} failed transiently, retrying once: {}", label, err);
            tokio::time::sleep(RETRY_DELAY).await;
            operation().await
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        DbConnection::setup_schema(db.pool()).await.expect("Second schema setup failed");
    }

    #[tokio::test]
    async fn test_retry_once_repeats_transient_failure() {
        let attempts = AtomicUsize::new(0);
        let result: Result<u32, anyhow::Error> = retry_once("test", || async {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(anyhow::Error::from(sqlx::Error::PoolTimedOut))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_once_gives_up_after_second_failure() {
        let attempts = AtomicUsize::new(0);
        let result: Result<u32, anyhow::Error> = retry_once("test", || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::Error::from(sqlx::Error::PoolTimedOut))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_failures_are_not_retried() {
        let attempts = AtomicUsize::new(0);
        let result: Result<u32, anyhow::Error> = retry_once("test", || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("constraint violated"))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
