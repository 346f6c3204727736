//! tutorkit-storage — SQLite persistence.
//!
//! Implements the core's `ConversationStore` and `TestStore` traits on a
//! shared SQLite pool: an append-only turns table and a per-student test
//! catalog with JSON columns for nested question data.

mod catalog;
mod conversation;
mod sqlite_pool;

pub use catalog::SqliteTestCatalog;
pub use conversation::SqliteConversationLog;
pub use sqlite_pool::SqlitePoolManager;
