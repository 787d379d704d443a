//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    EntriesCommand, ExportQuery, HabitsCommand, HabitsQuery, ImportCommand, JournalCommand,
    JournalQuery, LoginService, OrderedHabitsQuery, ProfileCommand, ProfileQuery,
    RegistrationCommand, ReorderCommand,
};

/// Dependency bundle for HTTP handlers: one `Arc<dyn Port>` per use-case.
#[derive(Clone)]
pub struct HttpState {
    /// Account creation.
    pub registration: Arc<dyn RegistrationCommand>,
    /// Credential authentication.
    pub login: Arc<dyn LoginService>,
    /// Profile updates.
    pub profile: Arc<dyn ProfileCommand>,
    /// Profile reads.
    pub profile_query: Arc<dyn ProfileQuery>,
    /// Habit create/rename/remove.
    pub habits: Arc<dyn HabitsCommand>,
    /// The grid read.
    pub habits_query: Arc<dyn HabitsQuery>,
    /// Entry upserts.
    pub entries: Arc<dyn EntriesCommand>,
    /// Drag-reorder persistence.
    pub reorder: Arc<dyn ReorderCommand>,
    /// Display-order read, returned to the client after a reorder.
    pub ordered: Arc<dyn OrderedHabitsQuery>,
    /// Journal writes.
    pub journal: Arc<dyn JournalCommand>,
    /// Journal reads.
    pub journal_query: Arc<dyn JournalQuery>,
    /// Batch import.
    pub import: Arc<dyn ImportCommand>,
    /// Export read path.
    pub export: Arc<dyn ExportQuery>,
}
