//! Ordering service: persists drag-reorders and serves display order.
//!
//! Positions are dense indices: after a successful reorder the habit at
//! index `i` of the submitted list holds position `i`, so positions are
//! unique and contiguous from 0. The repository applies the whole update
//! inside one transaction; nothing changes when any single update fails.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::domain::habits::Habit;
use crate::domain::habits::service::map_habit_repo_error;
use crate::domain::ports::{
    HabitRepository, OrderedHabitsQuery, ReorderCommand,
};
use crate::domain::{Error, UserId};

/// Ordering service implementing [`ReorderCommand`] and
/// [`OrderedHabitsQuery`].
#[derive(Clone)]
pub struct OrderingService<H> {
    habits: Arc<H>,
}

impl<H> OrderingService<H> {
    /// Create a new service over the habit store.
    pub fn new(habits: Arc<H>) -> Self {
        Self { habits }
    }
}

#[async_trait]
impl<H> ReorderCommand for OrderingService<H>
where
    H: HabitRepository,
{
    async fn reorder(&self, user_id: &UserId, ordered_ids: Vec<Uuid>) -> Result<(), Error> {
        if ordered_ids.is_empty() {
            return Ok(());
        }

        let mut seen = HashSet::with_capacity(ordered_ids.len());
        for id in &ordered_ids {
            if !seen.insert(*id) {
                return Err(
                    Error::invalid_request("orderedIds must not contain duplicates")
                        .with_details(json!({
                            "habitId": id,
                            "code": "duplicate_habit_id",
                        })),
                );
            }
        }

        self.habits
            .reorder(user_id, &ordered_ids)
            .await
            .map_err(map_habit_repo_error)?;
        debug!(count = ordered_ids.len(), "habit order persisted");
        Ok(())
    }
}

#[async_trait]
impl<H> OrderedHabitsQuery for OrderingService<H>
where
    H: HabitRepository,
{
    async fn list_ordered(&self, user_id: &UserId) -> Result<Vec<Habit>, Error> {
        self.habits
            .list_active(user_id)
            .await
            .map_err(map_habit_repo_error)
    }
}
