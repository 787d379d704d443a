//! Port for habit persistence.
//!
//! The [`HabitRepository`] trait is the contract for storing habit records
//! and maintaining their display positions. Adapters implement it on top of
//! durable storage (PostgreSQL in production).

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::habits::{Habit, HabitName};
use crate::domain::UserId;

/// Errors raised by habit repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HabitRepositoryError {
    /// Repository connection could not be established.
    #[error("habit repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("habit repository query failed: {message}")]
    Query { message: String },
    /// A mutation targeted a habit the caller does not own.
    #[error("habit {habit_id} is not owned by the caller")]
    NotOwned { habit_id: Uuid },
}

impl HabitRepositoryError {
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

    /// Create an ownership violation error for the given habit.
    pub fn not_owned(habit_id: Uuid) -> Self {
        Self::NotOwned { habit_id }
    }
}

/// Insert payload for a new habit.
///
/// When `position` is `None` the adapter must assign `max(position) + 1`
/// over the user's habits inside the same transaction as the insert, so a
/// habit never exists without a display rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabit {
    /// Owning user.
    pub user_id: UserId,
    /// Validated display name.
    pub name: HabitName,
    /// Decorative emoji, empty when unset.
    pub emoji: String,
    /// Explicit display rank, or `None` for next-available.
    pub position: Option<i32>,
}

/// Port for habit storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HabitRepository: Send + Sync {
    /// Find the user's habit with the given name and active flag.
    async fn find_by_name(
        &self,
        user_id: &UserId,
        name: &HabitName,
        active: bool,
    ) -> Result<Option<Habit>, HabitRepositoryError>;

    /// Find a habit by id, provided the user owns it.
    async fn find_owned(
        &self,
        user_id: &UserId,
        habit_id: &Uuid,
    ) -> Result<Option<Habit>, HabitRepositoryError>;

    /// List the user's active habits ascending by position, with creation
    /// time as a stable tie-break.
    async fn list_active(&self, user_id: &UserId) -> Result<Vec<Habit>, HabitRepositoryError>;

    /// Insert a new active habit, assigning the next-available position
    /// when none is given. See [`NewHabit`].
    async fn insert(&self, habit: NewHabit) -> Result<Habit, HabitRepositoryError>;

    /// Overwrite the emoji and, when given, the position of an existing
    /// habit. Used by reconciliation merges; the name never changes here.
    async fn update_import_meta(
        &self,
        habit_id: &Uuid,
        emoji: &str,
        position: Option<i32>,
    ) -> Result<(), HabitRepositoryError>;

    /// Flip the active flag, preserving entries.
    async fn set_active(&self, habit_id: &Uuid, active: bool) -> Result<(), HabitRepositoryError>;

    /// Rename a habit, returning the updated record.
    async fn rename(
        &self,
        habit_id: &Uuid,
        name: &HabitName,
    ) -> Result<Habit, HabitRepositoryError>;

    /// Hard-delete a habit row. Callers decide whether deletion or
    /// deactivation applies; see the habit service.
    async fn delete(&self, habit_id: &Uuid) -> Result<(), HabitRepositoryError>;

    /// Assign `position = i` to the habit at index `i`, atomically.
    ///
    /// Ownership is checked per habit inside one transaction; encountering
    /// a habit the user does not own rolls back every update already
    /// applied and yields [`HabitRepositoryError::NotOwned`].
    async fn reorder(
        &self,
        user_id: &UserId,
        ordered_ids: &[Uuid],
    ) -> Result<(), HabitRepositoryError>;
}
