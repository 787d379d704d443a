//! Driving ports for the import/export read-write pair.

use async_trait::async_trait;

use crate::domain::reconciliation::{HabitExport, ImportBatch, ImportReport};
use crate::domain::{Error, UserId};

/// Domain use-case port for merging an uploaded batch into the stores.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImportCommand: Send + Sync {
    /// Reconcile the batch against the caller's habits and entries.
    ///
    /// Per-record failures are collected into the report; only a broken
    /// backing store fails the call itself.
    async fn import(&self, user_id: &UserId, batch: ImportBatch) -> Result<ImportReport, Error>;
}

/// Domain use-case port for the export read path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExportQuery: Send + Sync {
    /// The caller's habits in display order, in the import file shape.
    async fn export(&self, user_id: &UserId) -> Result<Vec<HabitExport>, Error>;
}
