//! Conversation log persistence.
//!
//! One row per turn, partitioned by student id. Timestamps are stored as
//! RFC 3339 TEXT with a fixed fractional width and explicit UTC marker,
//! so the column's lexicographic order is chronological order.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;
use uuid::Uuid;

use tutorkit_core::error::StorageError;
use tutorkit_core::model::{Role, Turn};
use tutorkit_core::traits::ConversationStore;

use crate::sqlite_pool::SqlitePoolManager;

/// SQLite-backed conversation log.
#[derive(Clone)]
pub struct SqliteConversationLog {
    pool_manager: SqlitePoolManager,
}

impl SqliteConversationLog {
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let log = Self { pool_manager };
        log.init().await?;
        Ok(log)
    }

    async fn init(&self) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                id TEXT PRIMARY KEY,
                student_id TEXT NOT NULL,
                role TEXT NOT NULL,
                body TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(db_err)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_turns_student_id ON turns(student_id);
            CREATE INDEX IF NOT EXISTS idx_turns_timestamp ON turns(timestamp);
            "#,
        )
        .execute(pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationLog {
    async fn append(&self, student_id: &str, turn: &Turn) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO turns (id, student_id, role, body, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(student_id)
        .bind(turn.role.to_string())
        .bind(&turn.text)
        .bind(encode_timestamp(&turn.timestamp))
        .execute(self.pool_manager.pool())
        .await
        .map_err(db_err)?;

        debug!(student_id, role = %turn.role, "turn appended");
        Ok(())
    }

    async fn query_recent(&self, student_id: &str, limit: u32) -> Result<Vec<Turn>, StorageError> {
        let rows: Vec<TurnRow> = sqlx::query_as(
            r#"
            SELECT role, body, timestamp FROM turns
            WHERE student_id = ?
            ORDER BY timestamp DESC
            LIMIT ?
            "#,
        )
        .bind(student_id)
        .bind(i64::from(limit))
        .fetch_all(self.pool_manager.pool())
        .await
        .map_err(db_err)?;

        rows.into_iter().map(TurnRow::into_turn).collect()
    }
}

#[derive(sqlx::FromRow)]
struct TurnRow {
    role: String,
    body: String,
    timestamp: String,
}

impl TurnRow {
    fn into_turn(self) -> Result<Turn, StorageError> {
        let role: Role = self.role.parse().map_err(StorageError::CorruptRecord)?;
        let timestamp = decode_timestamp(&self.timestamp)?;
        Ok(Turn {
            role,
            text: self.body,
            timestamp,
        })
    }
}

pub(crate) fn encode_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::CorruptRecord(format!("bad timestamp '{raw}': {e}")))
}

fn db_err(e: sqlx::Error) -> StorageError {
    StorageError::Database(e.to_string())
}
