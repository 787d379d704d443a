//! Driving ports for daily journal notes.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::journal::Journal;
use crate::domain::{Error, UserId};

/// Domain use-case port for writing a day's journal note.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JournalCommand: Send + Sync {
    /// Insert or overwrite the caller's note for the given day.
    async fn upsert_journal(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        body: String,
    ) -> Result<Journal, Error>;
}

/// Domain use-case port for reading a day's journal note.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JournalQuery: Send + Sync {
    /// The caller's note for the given day, if any.
    async fn fetch_journal(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Journal>, Error>;
}
