//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`/`*Query`/`LoginService`) are implemented by
//! domain services and called from inbound adapters; driven ports
//! (`*Repository`, `PasswordHasher`) are implemented by outbound adapters
//! and called from domain services.

mod accounts;
mod entry_repository;
mod habit_repository;
mod habits;
mod import;
mod journal;
mod journal_repository;
mod ordering;
mod password_hasher;
mod user_repository;

pub use accounts::{
    LoginService, ProfileCommand, ProfileQuery, ProfileUpdateRequest, RegistrationCommand,
    RegistrationRequest,
};
pub use entry_repository::{EntryRepository, EntryRepositoryError};
pub use habit_repository::{HabitRepository, HabitRepositoryError, NewHabit};
pub use habits::{
    CreateHabitOutcome, CreateHabitRequest, EntriesCommand, HabitGrid, HabitsCommand,
    HabitsQuery, RemoveHabitOutcome, RenameHabitRequest, UpsertEntryRequest,
};
pub use import::{ExportQuery, ImportCommand};
pub use journal::{JournalCommand, JournalQuery};
pub use journal_repository::{JournalRepository, JournalRepositoryError};
pub use ordering::{OrderedHabitsQuery, ReorderCommand};
pub use password_hasher::{PasswordHasher, PasswordHasherError};
pub use user_repository::{
    CredentialUser, NewUserRecord, UserRepository, UserRepositoryError,
};

#[cfg(test)]
pub use accounts::{
    MockLoginService, MockProfileCommand, MockProfileQuery, MockRegistrationCommand,
};
#[cfg(test)]
pub use entry_repository::MockEntryRepository;
#[cfg(test)]
pub use habit_repository::MockHabitRepository;
#[cfg(test)]
pub use habits::{MockEntriesCommand, MockHabitsCommand, MockHabitsQuery};
#[cfg(test)]
pub use import::{MockExportQuery, MockImportCommand};
#[cfg(test)]
pub use journal::{MockJournalCommand, MockJournalQuery};
#[cfg(test)]
pub use journal_repository::MockJournalRepository;
#[cfg(test)]
pub use ordering::{MockOrderedHabitsQuery, MockReorderCommand};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
#[cfg(test)]
pub use user_repository::MockUserRepository;
