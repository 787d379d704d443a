//! PostgreSQL-backed `EntryRepository` implementation using Diesel ORM.
//!
//! The `(habit_id, entry_date)` unique constraint carries the upsert: an
//! `ON CONFLICT DO UPDATE` overwrites `completed` in place, so at most one
//! row exists per habit per day regardless of call ordering.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::habits::HabitEntry;
use crate::domain::ports::{EntryRepository, EntryRepositoryError};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{HabitEntryRow, NewHabitEntryRow};
use super::pool::{DbPool, PoolError};
use super::schema::habit_entries;

/// Diesel-backed implementation of the entry repository port.
#[derive(Clone)]
pub struct DieselEntryRepository {
    pool: DbPool,
}

impl DieselEntryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EntryRepositoryError {
    map_basic_pool_error(error, EntryRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> EntryRepositoryError {
    map_basic_diesel_error(
        error,
        EntryRepositoryError::query,
        EntryRepositoryError::connection,
    )
}

fn row_to_entry(row: HabitEntryRow) -> HabitEntry {
    HabitEntry {
        id: row.id,
        habit_id: row.habit_id,
        date: row.entry_date,
        completed: row.completed,
    }
}

#[async_trait]
impl EntryRepository for DieselEntryRepository {
    async fn upsert(
        &self,
        habit_id: &Uuid,
        date: NaiveDate,
        completed: bool,
    ) -> Result<HabitEntry, EntryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewHabitEntryRow {
            id: Uuid::new_v4(),
            habit_id: *habit_id,
            entry_date: date,
            completed,
        };

        let row = diesel::insert_into(habit_entries::table)
            .values(&new_row)
            .on_conflict((habit_entries::habit_id, habit_entries::entry_date))
            .do_update()
            .set((
                habit_entries::completed.eq(completed),
                habit_entries::updated_at.eq(diesel::dsl::now),
            ))
            .returning(HabitEntryRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_entry(row))
    }

    async fn list_for_habit(
        &self,
        habit_id: &Uuid,
    ) -> Result<Vec<HabitEntry>, EntryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<HabitEntryRow> = habit_entries::table
            .filter(habit_entries::habit_id.eq(habit_id))
            .order(habit_entries::entry_date.asc())
            .select(HabitEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_entry).collect())
    }

    async fn count_for_habit(&self, habit_id: &Uuid) -> Result<u64, EntryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = habit_entries::table
            .filter(habit_entries::habit_id.eq(habit_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        u64::try_from(count)
            .map_err(|_| EntryRepositoryError::query("entry count outside u64 range"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion.

    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, EntryRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn diesel_error_maps_to_query_error() {
        let repo_err = map_diesel_error(diesel::result::Error::NotFound);

        assert!(matches!(repo_err, EntryRepositoryError::Query { .. }));
    }

    #[rstest]
    fn row_conversion_maps_entry_date_to_date() {
        let date: NaiveDate = "2024-01-05".parse().expect("valid date");
        let row = HabitEntryRow {
            id: Uuid::new_v4(),
            habit_id: Uuid::new_v4(),
            entry_date: date,
            completed: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let entry = row_to_entry(row);
        assert_eq!(entry.date, date);
        assert!(entry.completed);
    }
}
