//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Unique-constraint violations on insert and update are inspected by
//! constraint name so the domain can distinguish a taken email from a
//! taken username.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    CredentialUser, NewUserRecord, UserRepository, UserRepositoryError,
};
use crate::domain::user::{DisplayName, EmailAddress, UserId, UserProfile, Username};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

/// Map a write error, resolving unique violations by constraint name.
fn map_write_error(error: diesel::result::Error) -> UserRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &error {
        match info.constraint_name() {
            Some(name) if name.contains("email") => return UserRepositoryError::DuplicateEmail,
            Some(name) if name.contains("username") => {
                return UserRepositoryError::DuplicateUsername;
            }
            _ => {}
        }
    }
    map_diesel_error(error)
}

/// Convert a database row into a validated domain profile.
fn row_to_profile(row: &UserRow) -> Result<UserProfile, UserRepositoryError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|err| UserRepositoryError::query(format!("stored email invalid: {err}")))?;
    let username = Username::new(&row.username)
        .map_err(|err| UserRepositoryError::query(format!("stored username invalid: {err}")))?;
    let display_name = DisplayName::new(&row.display_name).map_err(|err| {
        UserRepositoryError::query(format!("stored display name invalid: {err}"))
    })?;

    Ok(UserProfile {
        id: UserId::from_uuid(row.id),
        email,
        username,
        display_name,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, record: NewUserRecord) -> Result<UserProfile, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            email: record.email.as_str(),
            username: record.username.as_str(),
            display_name: record.display_name.as_str(),
            password_hash: &record.password_hash,
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_write_error)?;

        row_to_profile(&row)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<CredentialUser>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| {
            let profile = row_to_profile(&row)?;
            Ok(CredentialUser {
                profile,
                password_hash: row.password_hash,
            })
        })
        .transpose()
    }

    async fn find_by_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProfile>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(user_id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.as_ref().map(row_to_profile).transpose()
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let found: Option<Uuid> = users::table
            .filter(users::username.eq(username.as_str()))
            .select(users::id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(found.is_some())
    }

    async fn username_taken_by_other(
        &self,
        username: &Username,
        user_id: &UserId,
    ) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let found: Option<Uuid> = users::table
            .filter(
                users::username
                    .eq(username.as_str())
                    .and(users::id.ne(user_id.as_uuid())),
            )
            .select(users::id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(found.is_some())
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        display_name: Option<&DisplayName>,
        username: Option<&Username>,
    ) -> Result<UserProfile, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = UserProfileChangeset {
            display_name: display_name.map(DisplayName::as_str),
            username: username.map(Username::as_str),
        };

        let row: UserRow = diesel::update(users::table.filter(users::id.eq(user_id.as_uuid())))
            .set((&changeset, users::updated_at.eq(diesel::dsl::now)))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_write_error)?;

        row_to_profile(&row)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion.

    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn valid_row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_owned(),
            username: "ada".to_owned(),
            display_name: "Ada Lovelace".to_owned(),
            password_hash: "hash".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(repo_err, UserRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn diesel_error_maps_to_query_error() {
        let repo_err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(repo_err, UserRepositoryError::Query { .. }));
    }

    #[rstest]
    fn row_conversion_produces_validated_profile() {
        let row = valid_row();
        let profile = row_to_profile(&row).expect("valid row converts");
        assert_eq!(profile.email.as_str(), "ada@example.com");
        assert_eq!(profile.username.as_str(), "ada");
    }

    #[rstest]
    fn row_conversion_rejects_invalid_stored_email() {
        let mut row = valid_row();
        row.email = "not-an-email".to_owned();

        let error = row_to_profile(&row).expect_err("invalid email should fail");
        assert!(matches!(error, UserRepositoryError::Query { .. }));
        assert!(error.to_string().contains("stored email invalid"));
    }
}
