//! Daily journal entries keyed by user and calendar day.
//!
//! Journal text is independent of any habit: one optional note per user per
//! day, upserted in place. Import records may still carry per-entry journal
//! text for file-shape compatibility; the reconciliation engine folds that
//! into this model.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{
    JournalCommand, JournalQuery, JournalRepository, JournalRepositoryError,
};
use crate::domain::{Error, UserId};

/// One user's journal text for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journal {
    /// Owning user.
    pub user_id: UserId,
    /// Calendar day the note belongs to.
    pub date: NaiveDate,
    /// Free-form note text; may be empty.
    pub body: String,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Journal service implementing the journal driving ports.
#[derive(Clone)]
pub struct JournalService<J> {
    repo: Arc<J>,
}

impl<J> JournalService<J> {
    /// Create a new service with the given repository.
    pub fn new(repo: Arc<J>) -> Self {
        Self { repo }
    }
}

pub(crate) fn map_journal_repo_error(error: JournalRepositoryError) -> Error {
    match error {
        JournalRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("journal repository unavailable: {message}"))
        }
        JournalRepositoryError::Query { message } => {
            Error::internal(format!("journal repository error: {message}"))
        }
    }
}

#[async_trait]
impl<J> JournalCommand for JournalService<J>
where
    J: JournalRepository,
{
    async fn upsert_journal(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        body: String,
    ) -> Result<Journal, Error> {
        self.repo
            .upsert(user_id, date, &body)
            .await
            .map_err(map_journal_repo_error)
    }
}

#[async_trait]
impl<J> JournalQuery for JournalService<J>
where
    J: JournalRepository,
{
    async fn fetch_journal(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Journal>, Error> {
        self.repo
            .find(user_id, date)
            .await
            .map_err(map_journal_repo_error)
    }
}
