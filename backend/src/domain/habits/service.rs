//! Habit domain services: CRUD, the grid read, and entry upserts.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::domain::habits::{Habit, HabitEntry, HabitWithEntries};
use crate::domain::journal::map_journal_repo_error;
use crate::domain::ports::{
    CreateHabitOutcome, CreateHabitRequest, EntriesCommand, EntryRepository,
    EntryRepositoryError, HabitGrid, HabitRepository, HabitRepositoryError, HabitsCommand,
    HabitsQuery, JournalRepository, NewHabit, RemoveHabitOutcome, RenameHabitRequest,
    UpsertEntryRequest,
};
use crate::domain::{Error, UserId};

/// Habit service implementing the habit driving ports.
#[derive(Clone)]
pub struct HabitService<H, E, J> {
    habits: Arc<H>,
    entries: Arc<E>,
    journals: Arc<J>,
}

impl<H, E, J> HabitService<H, E, J> {
    /// Create a new service over the habit, entry, and journal stores.
    pub fn new(habits: Arc<H>, entries: Arc<E>, journals: Arc<J>) -> Self {
        Self {
            habits,
            entries,
            journals,
        }
    }
}

pub(crate) fn map_habit_repo_error(error: HabitRepositoryError) -> Error {
    match error {
        HabitRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("habit repository unavailable: {message}"))
        }
        HabitRepositoryError::Query { message } => {
            Error::internal(format!("habit repository error: {message}"))
        }
        HabitRepositoryError::NotOwned { habit_id } => {
            Error::forbidden("habit is not owned by the caller").with_details(json!({
                "habitId": habit_id,
                "code": "not_owned",
            }))
        }
    }
}

pub(crate) fn map_entry_repo_error(error: EntryRepositoryError) -> Error {
    match error {
        EntryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("entry repository unavailable: {message}"))
        }
        EntryRepositoryError::Query { message } => {
            Error::internal(format!("entry repository error: {message}"))
        }
    }
}

fn habit_not_found(habit_id: &Uuid) -> Error {
    Error::not_found("habit not found").with_details(json!({
        "habitId": habit_id,
        "code": "habit_not_found",
    }))
}

impl<H, E, J> HabitService<H, E, J>
where
    H: HabitRepository,
    E: EntryRepository,
    J: JournalRepository,
{
    /// Fetch a habit the caller owns, or fail with `not_found`.
    ///
    /// Foreign habit ids resolve to the same error as unknown ones so the
    /// endpoint does not leak other users' habit identifiers.
    async fn owned_habit(&self, user_id: &UserId, habit_id: &Uuid) -> Result<Habit, Error> {
        self.habits
            .find_owned(user_id, habit_id)
            .await
            .map_err(map_habit_repo_error)?
            .ok_or_else(|| habit_not_found(habit_id))
    }
}

#[async_trait]
impl<H, E, J> HabitsCommand for HabitService<H, E, J>
where
    H: HabitRepository,
    E: EntryRepository,
    J: JournalRepository,
{
    async fn create(&self, request: CreateHabitRequest) -> Result<CreateHabitOutcome, Error> {
        let CreateHabitRequest {
            user_id,
            name,
            emoji,
        } = request;

        if let Some(existing) = self
            .habits
            .find_by_name(&user_id, &name, true)
            .await
            .map_err(map_habit_repo_error)?
        {
            return Err(
                Error::conflict("an active habit with this name already exists").with_details(
                    json!({
                        "habitId": existing.id,
                        "code": "duplicate_habit",
                    }),
                ),
            );
        }

        if let Some(dormant) = self
            .habits
            .find_by_name(&user_id, &name, false)
            .await
            .map_err(map_habit_repo_error)?
        {
            self.habits
                .set_active(&dormant.id, true)
                .await
                .map_err(map_habit_repo_error)?;
            let mut habit = dormant;
            habit.active = true;
            return Ok(CreateHabitOutcome {
                habit,
                reactivated: true,
            });
        }

        let habit = self
            .habits
            .insert(NewHabit {
                user_id,
                name,
                emoji,
                position: None,
            })
            .await
            .map_err(map_habit_repo_error)?;
        Ok(CreateHabitOutcome {
            habit,
            reactivated: false,
        })
    }

    async fn rename(&self, request: RenameHabitRequest) -> Result<Habit, Error> {
        let RenameHabitRequest {
            user_id,
            habit_id,
            name,
        } = request;
        self.owned_habit(&user_id, &habit_id).await?;
        self.habits
            .rename(&habit_id, &name)
            .await
            .map_err(map_habit_repo_error)
    }

    async fn remove(
        &self,
        user_id: &UserId,
        habit_id: &Uuid,
    ) -> Result<RemoveHabitOutcome, Error> {
        let habit = self.owned_habit(user_id, habit_id).await?;
        let entry_count = self
            .entries
            .count_for_habit(&habit.id)
            .await
            .map_err(map_entry_repo_error)?;

        if entry_count == 0 {
            self.habits
                .delete(&habit.id)
                .await
                .map_err(map_habit_repo_error)?;
            Ok(RemoveHabitOutcome::Deleted)
        } else {
            self.habits
                .set_active(&habit.id, false)
                .await
                .map_err(map_habit_repo_error)?;
            Ok(RemoveHabitOutcome::Deactivated)
        }
    }
}

#[async_trait]
impl<H, E, J> HabitsQuery for HabitService<H, E, J>
where
    H: HabitRepository,
    E: EntryRepository,
    J: JournalRepository,
{
    async fn grid(&self, user_id: &UserId) -> Result<HabitGrid, Error> {
        let habits = self
            .habits
            .list_active(user_id)
            .await
            .map_err(map_habit_repo_error)?;

        let mut rows = Vec::with_capacity(habits.len());
        for habit in habits {
            let entries = self
                .entries
                .list_for_habit(&habit.id)
                .await
                .map_err(map_entry_repo_error)?;
            rows.push(HabitWithEntries { habit, entries });
        }

        let journals = self
            .journals
            .list_for_user(user_id)
            .await
            .map_err(map_journal_repo_error)?;

        Ok(HabitGrid {
            habits: rows,
            journals,
        })
    }
}

#[async_trait]
impl<H, E, J> EntriesCommand for HabitService<H, E, J>
where
    H: HabitRepository,
    E: EntryRepository,
    J: JournalRepository,
{
    async fn upsert_entry(&self, request: UpsertEntryRequest) -> Result<HabitEntry, Error> {
        let UpsertEntryRequest {
            user_id,
            habit_id,
            date,
            completed,
        } = request;
        let habit = self.owned_habit(&user_id, &habit_id).await?;
        self.entries
            .upsert(&habit.id, date, completed)
            .await
            .map_err(map_entry_repo_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::habits::HabitName;
    use crate::domain::ports::{
        MockEntryRepository, MockHabitRepository, MockJournalRepository,
    };
    use crate::domain::ErrorCode;
    use chrono::Utc;
    use rstest::rstest;

    fn habit(user_id: &UserId, name: &str, active: bool, position: i32) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            name: HabitName::new(name).expect("fixture name"),
            emoji: String::new(),
            active,
            position,
            created_at: Utc::now(),
        }
    }

    fn service(
        habits: MockHabitRepository,
        entries: MockEntryRepository,
    ) -> HabitService<MockHabitRepository, MockEntryRepository, MockJournalRepository> {
        HabitService::new(
            Arc::new(habits),
            Arc::new(entries),
            Arc::new(MockJournalRepository::new()),
        )
    }

    fn create_request(user_id: &UserId, name: &str) -> CreateHabitRequest {
        CreateHabitRequest {
            user_id: user_id.clone(),
            name: HabitName::new(name).expect("request name"),
            emoji: String::new(),
        }
    }

    #[tokio::test]
    async fn create_conflicts_on_active_duplicate() {
        let user = UserId::random();
        let existing = habit(&user, "Reading", true, 0);
        let mut habits = MockHabitRepository::new();
        habits
            .expect_find_by_name()
            .withf(|_, _, active| *active)
            .return_once(move |_, _, _| Ok(Some(existing)));

        let service = service(habits, MockEntryRepository::new());
        let err = service
            .create(create_request(&user, "Reading"))
            .await
            .expect_err("duplicate is a conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn create_reactivates_inactive_habit_of_same_name() {
        let user = UserId::random();
        let dormant = habit(&user, "Reading", false, 2);
        let dormant_id = dormant.id;
        let mut habits = MockHabitRepository::new();
        habits
            .expect_find_by_name()
            .withf(|_, _, active| *active)
            .return_once(|_, _, _| Ok(None));
        habits
            .expect_find_by_name()
            .withf(|_, _, active| !*active)
            .return_once(move |_, _, _| Ok(Some(dormant)));
        habits
            .expect_set_active()
            .withf(move |id, active| *id == dormant_id && *active)
            .return_once(|_, _| Ok(()));

        let service = service(habits, MockEntryRepository::new());
        let outcome = service
            .create(create_request(&user, "Reading"))
            .await
            .expect("create succeeds");
        assert!(outcome.reactivated);
        assert!(outcome.habit.active);
        assert_eq!(outcome.habit.id, dormant_id);
    }

    #[tokio::test]
    async fn create_inserts_with_next_available_position() {
        let user = UserId::random();
        let stored = habit(&user, "Reading", true, 5);
        let mut habits = MockHabitRepository::new();
        habits.expect_find_by_name().times(2).returning(|_, _, _| Ok(None));
        habits
            .expect_insert()
            .withf(|new| new.position.is_none())
            .return_once(move |_| Ok(stored));

        let service = service(habits, MockEntryRepository::new());
        let outcome = service
            .create(create_request(&user, "Reading"))
            .await
            .expect("create succeeds");
        assert!(!outcome.reactivated);
        assert_eq!(outcome.habit.position, 5);
    }

    #[tokio::test]
    async fn remove_deletes_habit_without_entries() {
        let user = UserId::random();
        let owned = habit(&user, "Reading", true, 0);
        let habit_id = owned.id;
        let mut habits = MockHabitRepository::new();
        habits
            .expect_find_owned()
            .return_once(move |_, _| Ok(Some(owned)));
        habits
            .expect_delete()
            .withf(move |id| *id == habit_id)
            .return_once(|_| Ok(()));
        let mut entries = MockEntryRepository::new();
        entries.expect_count_for_habit().return_once(|_| Ok(0));

        let service = service(habits, entries);
        let outcome = service
            .remove(&user, &habit_id)
            .await
            .expect("remove succeeds");
        assert_eq!(outcome, RemoveHabitOutcome::Deleted);
    }

    #[tokio::test]
    async fn remove_deactivates_habit_with_entries() {
        let user = UserId::random();
        let owned = habit(&user, "Reading", true, 0);
        let habit_id = owned.id;
        let mut habits = MockHabitRepository::new();
        habits
            .expect_find_owned()
            .return_once(move |_, _| Ok(Some(owned)));
        habits
            .expect_set_active()
            .withf(move |id, active| *id == habit_id && !*active)
            .return_once(|_, _| Ok(()));
        let mut entries = MockEntryRepository::new();
        entries.expect_count_for_habit().return_once(|_| Ok(3));

        let service = service(habits, entries);
        let outcome = service
            .remove(&user, &habit_id)
            .await
            .expect("remove succeeds");
        assert_eq!(outcome, RemoveHabitOutcome::Deactivated);
    }

    #[tokio::test]
    async fn upsert_entry_rejects_unknown_habit() {
        let user = UserId::random();
        let mut habits = MockHabitRepository::new();
        habits.expect_find_owned().return_once(|_, _| Ok(None));

        let service = service(habits, MockEntryRepository::new());
        let err = service
            .upsert_entry(UpsertEntryRequest {
                user_id: user,
                habit_id: Uuid::new_v4(),
                date: "2024-01-05".parse().expect("valid date"),
                completed: true,
            })
            .await
            .expect_err("unknown habit is not found");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    fn not_owned_maps_to_forbidden() {
        let err = map_habit_repo_error(HabitRepositoryError::not_owned(Uuid::nil()));
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn connection_failure_maps_to_service_unavailable() {
        let err = map_habit_repo_error(HabitRepositoryError::connection("refused"));
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
