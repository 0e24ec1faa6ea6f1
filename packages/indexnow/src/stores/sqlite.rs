//! SQLite sink for outcome records and the gate marker.
//!
//! One database file holds both tables:
//! - `indexnow_log` - one row per outcome record
//! - `indexnow_gate` - a single row with the last bulk run

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::error::{StoreError, StoreResult};
use crate::traits::gate_store::GateStore;
use crate::traits::recorder::OutcomeRecorder;
use crate::types::record::{OutcomeRecord, RecordSubject};

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(Box::new(e))
}

/// SQLite-backed recorder and gate store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct LogRow {
    subject: String,
    http_status: i64,
    message: String,
    user_id: i64,
    user_ip: String,
    submitted_count: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<LogRow> for OutcomeRecord {
    fn from(row: LogRow) -> Self {
        let subject = match row.subject.as_str() {
            "bulk" => RecordSubject::Bulk,
            id => RecordSubject::Post(id.parse().unwrap_or_default()),
        };
        OutcomeRecord {
            subject,
            http_status: u16::try_from(row.http_status).unwrap_or_default(),
            message: row.message,
            user_id: row.user_id,
            user_ip: row.user_ip,
            submitted_count: row.submitted_count.and_then(|n| usize::try_from(n).ok()),
            timestamp: row.created_at,
        }
    }
}

impl SqliteStore {
    /// Open a store at the given connection URL and run migrations.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - In-memory database (ephemeral)
    /// - `sqlite://./data/indexnow.db?mode=rwc` - Create if not exists
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(backend)?;

        Self::from_pool(pool).await
    }

    /// In-memory store for tests. Pinned to one connection so every query
    /// sees the same database.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(backend)?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS indexnow_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject TEXT NOT NULL,
                http_status INTEGER NOT NULL,
                message TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                user_ip TEXT NOT NULL,
                submitted_count INTEGER,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_indexnow_log_subject ON indexnow_log(subject);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS indexnow_gate (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                last_run INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    /// Most recent records first.
    #[cfg(test)]
    async fn recent(&self, limit: i64) -> StoreResult<Vec<OutcomeRecord>> {
        let rows: Vec<LogRow> = sqlx::query_as(
            r#"
            SELECT subject, http_status, message, user_id, user_ip, submitted_count, created_at
            FROM indexnow_log
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(OutcomeRecord::from).collect())
    }
}

#[async_trait]
impl OutcomeRecorder for SqliteStore {
    async fn record(&self, entry: &OutcomeRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO indexnow_log
                (subject, http_status, message, user_id, user_ip, submitted_count, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.subject.to_string())
        .bind(i64::from(entry.http_status))
        .bind(&entry.message)
        .bind(entry.user_id)
        .bind(&entry.user_ip)
        .bind(entry.submitted_count.map(|n| n as i64))
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }
}

#[async_trait]
impl GateStore for SqliteStore {
    async fn load(&self) -> StoreResult<Option<i64>> {
        sqlx::query_scalar("SELECT last_run FROM indexnow_gate WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn save(&self, epoch_seconds: i64) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO indexnow_gate (id, last_run) VALUES (1, ?)
            ON CONFLICT(id) DO UPDATE SET last_run = excluded.last_run
            "#,
        )
        .bind(epoch_seconds)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    /// One conditional upsert, so processes sharing the database file
    /// cannot both take the same interval.
    async fn claim(&self, now: i64, interval_secs: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO indexnow_gate (id, last_run) VALUES (1, ?)
            ON CONFLICT(id) DO UPDATE SET last_run = excluded.last_run
            WHERE indexnow_gate.last_run <= ?
            "#,
        )
        .bind(now)
        .bind(now.saturating_sub(interval_secs))
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected() == 1)
    }
}
