//! Domain types and services.
//!
//! Purpose: define strongly typed entities (users, habits, entries,
//! journals) and the services implementing the driving ports, keeping every
//! rule about reconciliation, ordering, and account management out of the
//! adapters. Invariants and serialisation contracts live in each type's
//! Rustdoc.

pub mod accounts;
pub mod error;
pub mod habits;
pub mod journal;
pub mod ordering;
pub mod ports;
pub mod reconciliation;
pub mod user;

pub use self::accounts::{AccountService, LoginCredentials, LoginValidationError, PASSWORD_MIN};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::habits::{Habit, HabitEntry, HabitName, HabitService, HabitWithEntries};
pub use self::journal::{Journal, JournalService};
pub use self::ordering::OrderingService;
pub use self::reconciliation::ReconciliationService;
pub use self::user::{
    DisplayName, EmailAddress, UserId, UserProfile, UserValidationError, Username,
};

/// Convenient domain result alias.
pub type ApiResult<T> = Result<T, Error>;
