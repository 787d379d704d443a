//! Port for habit entry persistence.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::habits::HabitEntry;

/// Errors raised by entry repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryRepositoryError {
    /// Repository connection could not be established.
    #[error("entry repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("entry repository query failed: {message}")]
    Query { message: String },
}

impl EntryRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for entry storage keyed on `(habit_id, date)`.
///
/// Entries are upsert-only: writing an existing key overwrites `completed`
/// in place, so at most one row exists per habit per day.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Insert or overwrite the entry for `(habit_id, date)`.
    async fn upsert(
        &self,
        habit_id: &Uuid,
        date: NaiveDate,
        completed: bool,
    ) -> Result<HabitEntry, EntryRepositoryError>;

    /// All entries for a habit, ascending by date.
    async fn list_for_habit(
        &self,
        habit_id: &Uuid,
    ) -> Result<Vec<HabitEntry>, EntryRepositoryError>;

    /// Number of entries recorded for a habit.
    async fn count_for_habit(&self, habit_id: &Uuid) -> Result<u64, EntryRepositoryError>;
}
