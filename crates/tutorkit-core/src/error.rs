//! Error taxonomy for the tutoring core.
//!
//! Three classes of failure leave this crate: invalid caller input
//! (rejected before any collaborator is touched), unknown test lookups,
//! and storage faults, which always propagate because a dropped write is
//! data loss the caller must see. Generation faults are NOT represented
//! here: the gateway and the composer absorb them.

use thiserror::Error;

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum TutorError {
    /// A required identifier or message was missing or blank. Nothing was
    /// sent to any collaborator.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No test with this id exists for this student.
    #[error("unknown test '{test_id}' for student '{student_id}'")]
    TestNotFound { student_id: String, test_id: String },

    /// The conversation log or test catalog failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from the persistence collaborators.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),

    /// A stored value could not be decoded back into the data model.
    #[error("corrupt record: {0}")]
    CorruptRecord(String),
}
