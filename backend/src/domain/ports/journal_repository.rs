//! Port for journal persistence keyed on `(user_id, date)`.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::journal::Journal;
use crate::domain::UserId;

/// Errors raised by journal repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JournalRepositoryError {
    /// Repository connection could not be established.
    #[error("journal repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("journal repository query failed: {message}")]
    Query { message: String },
}

impl JournalRepositoryError {
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

/// Port for journal storage: one note per user per calendar day.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JournalRepository: Send + Sync {
    /// Insert or overwrite the note for `(user_id, date)`.
    async fn upsert(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        body: &str,
    ) -> Result<Journal, JournalRepositoryError>;

    /// Fetch the note for a single day, if any.
    async fn find(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Journal>, JournalRepositoryError>;

    /// All of a user's notes, ascending by date.
    async fn list_for_user(&self, user_id: &UserId)
        -> Result<Vec<Journal>, JournalRepositoryError>;
}
