//! Driving ports for habit CRUD, the grid read, and entry upserts.
//!
//! Inbound adapters call these use-cases without knowing the backing
//! repositories, which keeps HTTP handler tests deterministic.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::habits::{Habit, HabitEntry, HabitName, HabitWithEntries};
use crate::domain::journal::Journal;
use crate::domain::{Error, UserId};

/// Request to create a habit (or revive an inactive one of the same name).
#[derive(Debug, Clone)]
pub struct CreateHabitRequest {
    /// Authenticated owner.
    pub user_id: UserId,
    /// Validated habit name.
    pub name: HabitName,
    /// Decorative emoji, empty when unset.
    pub emoji: String,
}

/// Result of a create call.
#[derive(Debug, Clone)]
pub struct CreateHabitOutcome {
    /// The stored habit.
    pub habit: Habit,
    /// True when an inactive habit of the same name was revived instead of
    /// inserting a new row.
    pub reactivated: bool,
}

/// Request to rename a habit.
#[derive(Debug, Clone)]
pub struct RenameHabitRequest {
    /// Authenticated owner.
    pub user_id: UserId,
    /// Habit to rename.
    pub habit_id: Uuid,
    /// New validated name.
    pub name: HabitName,
}

/// How a remove call resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RemoveHabitOutcome {
    /// The habit had no entries and its row was removed.
    Deleted,
    /// The habit had entries and was deactivated instead.
    Deactivated,
}

/// Request to record completion state for one habit on one day.
#[derive(Debug, Clone)]
pub struct UpsertEntryRequest {
    /// Authenticated owner.
    pub user_id: UserId,
    /// Habit the entry belongs to.
    pub habit_id: Uuid,
    /// Calendar day.
    pub date: NaiveDate,
    /// Completion state to store.
    pub completed: bool,
}

/// The grid view: ordered habits with entries, plus the user's journals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitGrid {
    /// Active habits ascending by position, each with all entries.
    pub habits: Vec<HabitWithEntries>,
    /// Journal notes ascending by date.
    pub journals: Vec<Journal>,
}

/// Domain use-case port for habit mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HabitsCommand: Send + Sync {
    /// Create a habit, reviving an inactive habit of the same name when
    /// one exists. An active habit with the name is a conflict.
    async fn create(&self, request: CreateHabitRequest) -> Result<CreateHabitOutcome, Error>;

    /// Rename an owned habit.
    async fn rename(&self, request: RenameHabitRequest) -> Result<Habit, Error>;

    /// Remove an owned habit: hard-delete when it has no entries,
    /// deactivate otherwise.
    async fn remove(
        &self,
        user_id: &UserId,
        habit_id: &Uuid,
    ) -> Result<RemoveHabitOutcome, Error>;
}

/// Domain use-case port for the grid read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HabitsQuery: Send + Sync {
    /// The authenticated user's grid: ordered habits, entries, journals.
    async fn grid(&self, user_id: &UserId) -> Result<HabitGrid, Error>;
}

/// Domain use-case port for entry upserts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntriesCommand: Send + Sync {
    /// Insert or overwrite the entry for `(habit_id, date)` after checking
    /// the habit belongs to the caller.
    async fn upsert_entry(&self, request: UpsertEntryRequest) -> Result<HabitEntry, Error>;
}
