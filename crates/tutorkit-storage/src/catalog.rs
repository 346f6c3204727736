//! Test catalog persistence.
//!
//! One row per test. Question lists, submitted answers, and subject
//! breakdowns are nested documents, stored as JSON TEXT columns and
//! decoded at the boundary.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use tutorkit_core::error::StorageError;
use tutorkit_core::model::{NewTest, Submission, TestRecord};
use tutorkit_core::traits::TestStore;

use crate::conversation::{decode_timestamp, encode_timestamp};
use crate::sqlite_pool::SqlitePoolManager;

/// SQLite-backed test catalog.
#[derive(Clone)]
pub struct SqliteTestCatalog {
    pool_manager: SqlitePoolManager,
}

impl SqliteTestCatalog {
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let catalog = Self { pool_manager };
        catalog.init().await?;
        Ok(catalog)
    }

    async fn init(&self) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tests (
                id TEXT PRIMARY KEY,
                student_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                questions TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                score TEXT,
                student_answers TEXT,
                subject_scores TEXT
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(db_err)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_tests_student_id ON tests(student_id);
            CREATE INDEX IF NOT EXISTS idx_tests_created_at ON tests(created_at);
            "#,
        )
        .execute(pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

#[async_trait]
impl TestStore for SqliteTestCatalog {
    async fn create(&self, student_id: &str, test: &NewTest) -> Result<String, StorageError> {
        let test_id = Uuid::new_v4().to_string();
        let questions = serde_json::to_string(&test.questions).map_err(json_err)?;

        sqlx::query(
            r#"
            INSERT INTO tests (id, student_id, created_at, questions, completed, score)
            VALUES (?, ?, ?, ?, 0, NULL)
            "#,
        )
        .bind(&test_id)
        .bind(student_id)
        .bind(encode_timestamp(&test.created_at))
        .bind(questions)
        .execute(self.pool_manager.pool())
        .await
        .map_err(db_err)?;

        debug!(student_id, %test_id, "test stored");
        Ok(test_id)
    }

    async fn get(
        &self,
        student_id: &str,
        test_id: &str,
    ) -> Result<Option<TestRecord>, StorageError> {
        let row: Option<TestRow> = sqlx::query_as(
            r#"
            SELECT id, created_at, questions, completed, score, student_answers, subject_scores
            FROM tests
            WHERE student_id = ? AND id = ?
            "#,
        )
        .bind(student_id)
        .bind(test_id)
        .fetch_optional(self.pool_manager.pool())
        .await
        .map_err(db_err)?;

        row.map(TestRow::into_record).transpose()
    }

    async fn record_submission(
        &self,
        student_id: &str,
        test_id: &str,
        submission: &Submission,
    ) -> Result<(), StorageError> {
        let answers = serde_json::to_string(&submission.answers).map_err(json_err)?;
        let breakdown = serde_json::to_string(&submission.subject_scores).map_err(json_err)?;

        sqlx::query(
            r#"
            UPDATE tests
            SET completed = 1, score = ?, student_answers = ?, subject_scores = ?
            WHERE student_id = ? AND id = ?
            "#,
        )
        .bind(&submission.score)
        .bind(answers)
        .bind(breakdown)
        .bind(student_id)
        .bind(test_id)
        .execute(self.pool_manager.pool())
        .await
        .map_err(db_err)?;

        debug!(student_id, %test_id, "submission stored");
        Ok(())
    }

    async fn list_all(&self, student_id: &str) -> Result<Vec<TestRecord>, StorageError> {
        let rows: Vec<TestRow> = sqlx::query_as(
            r#"
            SELECT id, created_at, questions, completed, score, student_answers, subject_scores
            FROM tests
            WHERE student_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(student_id)
        .fetch_all(self.pool_manager.pool())
        .await
        .map_err(db_err)?;

        rows.into_iter().map(TestRow::into_record).collect()
    }
}

#[derive(sqlx::FromRow)]
struct TestRow {
    id: String,
    created_at: String,
    questions: String,
    completed: bool,
    score: Option<String>,
    student_answers: Option<String>,
    subject_scores: Option<String>,
}

impl TestRow {
    fn into_record(self) -> Result<TestRecord, StorageError> {
        let questions = serde_json::from_str(&self.questions)
            .map_err(|e| StorageError::CorruptRecord(format!("bad questions column: {e}")))?;
        let student_answers = self
            .student_answers
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| StorageError::CorruptRecord(format!("bad answers column: {e}")))?;
        let subject_scores = self
            .subject_scores
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| StorageError::CorruptRecord(format!("bad breakdown column: {e}")))?;

        Ok(TestRecord {
            test_id: self.id,
            created_at: decode_timestamp(&self.created_at)?,
            questions,
            completed: self.completed,
            score: self.score,
            student_answers,
            subject_scores,
        })
    }
}

fn db_err(e: sqlx::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

fn json_err(e: serde_json::Error) -> StorageError {
    StorageError::Database(format!("failed to encode document: {e}"))
}
