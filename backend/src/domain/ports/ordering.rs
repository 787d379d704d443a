//! Driving ports for habit display ordering.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::habits::Habit;
use crate::domain::{Error, UserId};

/// Domain use-case port for persisting a drag-reorder.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReorderCommand: Send + Sync {
    /// Assign position `i` to the habit at index `i` of `ordered_ids`,
    /// atomically. A habit not owned by the caller fails the whole call
    /// without changing any position.
    async fn reorder(&self, user_id: &UserId, ordered_ids: Vec<Uuid>) -> Result<(), Error>;
}

/// Domain use-case port for reading habits in display order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderedHabitsQuery: Send + Sync {
    /// The user's active habits ascending by position.
    async fn list_ordered(&self, user_id: &UserId) -> Result<Vec<Habit>, Error>;
}
