//! PostgreSQL-backed `HabitRepository` implementation using Diesel ORM.
//!
//! Position assignment and reordering run inside transactions so a habit
//! never exists without a rank and a partial reorder is never visible.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::habits::{Habit, HabitName};
use crate::domain::ports::{HabitRepository, HabitRepositoryError, NewHabit};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{HabitImportChangeset, HabitRow, NewHabitRow};
use super::pool::{DbPool, PoolError};
use super::schema::habits;

/// Diesel-backed implementation of the habit repository port.
#[derive(Clone)]
pub struct DieselHabitRepository {
    pool: DbPool,
}

impl DieselHabitRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> HabitRepositoryError {
    map_basic_pool_error(error, HabitRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> HabitRepositoryError {
    map_basic_diesel_error(
        error,
        HabitRepositoryError::query,
        HabitRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain habit.
fn row_to_habit(row: HabitRow) -> Result<Habit, HabitRepositoryError> {
    let HabitRow {
        id,
        user_id,
        name,
        emoji,
        active,
        position,
        created_at,
    } = row;

    let name = HabitName::new(&name)
        .map_err(|err| HabitRepositoryError::query(format!("stored habit name invalid: {err}")))?;

    Ok(Habit {
        id,
        user_id: UserId::from_uuid(user_id),
        name,
        emoji,
        active,
        position,
        created_at,
    })
}

/// Error carrier inside the reorder transaction, distinguishing ownership
/// misses from database failures so the adapter can roll back on both.
enum ReorderTxError {
    NotOwned(Uuid),
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for ReorderTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

#[async_trait]
impl HabitRepository for DieselHabitRepository {
    async fn find_by_name(
        &self,
        user_id: &UserId,
        name: &HabitName,
        active: bool,
    ) -> Result<Option<Habit>, HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<HabitRow> = habits::table
            .filter(
                habits::user_id
                    .eq(user_id.as_uuid())
                    .and(habits::name.eq(name.as_str()))
                    .and(habits::active.eq(active)),
            )
            .order(habits::created_at.asc())
            .select(HabitRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_habit).transpose()
    }

    async fn find_owned(
        &self,
        user_id: &UserId,
        habit_id: &Uuid,
    ) -> Result<Option<Habit>, HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<HabitRow> = habits::table
            .filter(
                habits::id
                    .eq(habit_id)
                    .and(habits::user_id.eq(user_id.as_uuid())),
            )
            .select(HabitRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_habit).transpose()
    }

    async fn list_active(&self, user_id: &UserId) -> Result<Vec<Habit>, HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<HabitRow> = habits::table
            .filter(habits::user_id.eq(user_id.as_uuid()).and(habits::active.eq(true)))
            .order((habits::position.asc(), habits::created_at.asc()))
            .select(HabitRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_habit).collect()
    }

    async fn insert(&self, habit: NewHabit) -> Result<Habit, HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *habit.user_id.as_uuid();
        let explicit_position = habit.position;
        let name = habit.name.as_str().to_owned();
        let emoji = habit.emoji;

        // The max(position) read and the insert share a transaction so two
        // concurrent creates cannot claim the same next-available rank from
        // a stale read committed in between.
        let row = conn
            .transaction::<HabitRow, diesel::result::Error, _>(|conn| {
                async move {
                    let current_max: Option<i32> = habits::table
                        .filter(habits::user_id.eq(owner))
                        .select(diesel::dsl::max(habits::position))
                        .first(conn)
                        .await?;
                    let position =
                        explicit_position.unwrap_or_else(|| current_max.map_or(0, |max| max + 1));

                    diesel::insert_into(habits::table)
                        .values(&NewHabitRow {
                            id: Uuid::new_v4(),
                            user_id: owner,
                            name: &name,
                            emoji: &emoji,
                            active: true,
                            position,
                        })
                        .returning(HabitRow::as_returning())
                        .get_result(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        row_to_habit(row)
    }

    async fn update_import_meta(
        &self,
        habit_id: &Uuid,
        emoji: &str,
        position: Option<i32>,
    ) -> Result<(), HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(habits::table.filter(habits::id.eq(habit_id)))
            .set(&HabitImportChangeset { emoji, position })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn set_active(&self, habit_id: &Uuid, active: bool) -> Result<(), HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(habits::table.filter(habits::id.eq(habit_id)))
            .set(habits::active.eq(active))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn rename(
        &self,
        habit_id: &Uuid,
        name: &HabitName,
    ) -> Result<Habit, HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(habits::table.filter(habits::id.eq(habit_id)))
            .set(habits::name.eq(name.as_str()))
            .returning(HabitRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_habit(row)
    }

    async fn delete(&self, habit_id: &Uuid) -> Result<(), HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(habits::table.filter(habits::id.eq(habit_id)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn reorder(
        &self,
        user_id: &UserId,
        ordered_ids: &[Uuid],
    ) -> Result<(), HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *user_id.as_uuid();
        let ids = ordered_ids.to_vec();

        let result = conn
            .transaction::<(), ReorderTxError, _>(|conn| {
                async move {
                    for (index, habit_id) in ids.iter().enumerate() {
                        let position = i32::try_from(index).map_err(|_| {
                            ReorderTxError::Diesel(diesel::result::Error::QueryBuilderError(
                                "reorder index exceeds i32 range".into(),
                            ))
                        })?;
                        // The ownership filter rides on the update itself;
                        // zero affected rows means a foreign or unknown id
                        // and rolls back the whole reorder.
                        let updated = diesel::update(
                            habits::table.filter(
                                habits::id.eq(habit_id).and(habits::user_id.eq(owner)),
                            ),
                        )
                        .set(habits::position.eq(position))
                        .execute(conn)
                        .await
                        .map_err(ReorderTxError::Diesel)?;

                        if updated == 0 {
                            return Err(ReorderTxError::NotOwned(*habit_id));
                        }
                    }
                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(ReorderTxError::NotOwned(habit_id)) => {
                Err(HabitRepositoryError::not_owned(habit_id))
            }
            Err(ReorderTxError::Diesel(error)) => Err(map_diesel_error(error)),
        }
    }
}
