//! Habit aggregate: validated names, the habit record, and daily entries.
//!
//! Display order lives on the habit itself as a mandatory `position`
//! assigned when the habit is created; see [`crate::domain::ordering`] for
//! the reorder semantics.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

pub mod service;

pub use service::HabitService;

/// Maximum allowed length for a habit name.
pub const HABIT_NAME_MAX: usize = 100;

/// Validation errors for [`HabitName`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitValidationError {
    EmptyName,
    NameTooLong { max: usize },
}

impl fmt::Display for HabitValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "habit name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "habit name must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for HabitValidationError {}

/// Trimmed, non-empty habit name.
///
/// Names are the soft natural key reconciliation matches on, so the trim
/// happens here rather than in each caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HabitName(String);

impl HabitName {
    /// Validate and construct a [`HabitName`], trimming whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, HabitValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(HabitValidationError::EmptyName);
        }
        if trimmed.chars().count() > HABIT_NAME_MAX {
            return Err(HabitValidationError::NameTooLong {
                max: HABIT_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The validated name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HabitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<HabitName> for String {
    fn from(value: HabitName) -> Self {
        value.0
    }
}

impl TryFrom<String> for HabitName {
    type Error = HabitValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A user-defined recurring activity tracked per calendar day.
///
/// ## Invariants
/// - `position` is assigned at creation and only changes through reorder.
/// - Among a user's active habits, positions define a strict total order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Stable habit identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Display name; soft natural key for reconciliation.
    pub name: HabitName,
    /// Decorative emoji, empty when unset.
    pub emoji: String,
    /// Whether the habit appears in the grid. Deactivated habits keep
    /// their entries and can be revived by name.
    pub active: bool,
    /// Display rank among the user's habits, serialised as `order` for
    /// compatibility with the import/export file shape.
    #[serde(rename = "order")]
    pub position: i32,
    /// Creation timestamp; stable tie-break for equal positions.
    pub created_at: DateTime<Utc>,
}

/// Completion record for one habit on one calendar day.
///
/// Unique on `(habit_id, date)`; mutation is upsert-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitEntry {
    /// Stable entry identifier.
    pub id: Uuid,
    /// Owning habit.
    pub habit_id: Uuid,
    /// Calendar day, no time component.
    pub date: NaiveDate,
    /// Whether the habit was completed on this day.
    pub completed: bool,
}

/// A habit together with all of its entries, as served to the grid view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitWithEntries {
    /// The habit record.
    #[serde(flatten)]
    pub habit: Habit,
    /// All entries for this habit, ascending by date.
    pub entries: Vec<HabitEntry>,
}
