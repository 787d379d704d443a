//! PostgreSQL-backed `JournalRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::journal::Journal;
use crate::domain::ports::{JournalRepository, JournalRepositoryError};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{JournalRow, NewJournalRow};
use super::pool::{DbPool, PoolError};
use super::schema::journals;

/// Diesel-backed implementation of the journal repository port.
#[derive(Clone)]
pub struct DieselJournalRepository {
    pool: DbPool,
}

impl DieselJournalRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> JournalRepositoryError {
    map_basic_pool_error(error, JournalRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> JournalRepositoryError {
    map_basic_diesel_error(
        error,
        JournalRepositoryError::query,
        JournalRepositoryError::connection,
    )
}

fn row_to_journal(row: JournalRow) -> Journal {
    Journal {
        user_id: UserId::from_uuid(row.user_id),
        date: row.entry_date,
        body: row.body,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl JournalRepository for DieselJournalRepository {
    async fn upsert(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        body: &str,
    ) -> Result<Journal, JournalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewJournalRow {
            id: Uuid::new_v4(),
            user_id: *user_id.as_uuid(),
            entry_date: date,
            body,
        };

        let row = diesel::insert_into(journals::table)
            .values(&new_row)
            .on_conflict((journals::user_id, journals::entry_date))
            .do_update()
            .set((
                journals::body.eq(body),
                journals::updated_at.eq(diesel::dsl::now),
            ))
            .returning(JournalRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_journal(row))
    }

    async fn find(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Journal>, JournalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<JournalRow> = journals::table
            .filter(
                journals::user_id
                    .eq(user_id.as_uuid())
                    .and(journals::entry_date.eq(date)),
            )
            .select(JournalRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_journal))
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Journal>, JournalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<JournalRow> = journals::table
            .filter(journals::user_id.eq(user_id.as_uuid()))
            .order(journals::entry_date.asc())
            .select(JournalRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_journal).collect())
    }
}
