//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{habit_entries, habits, journals, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub username: &'a str,
    pub display_name: &'a str,
    pub password_hash: &'a str,
}

/// Changeset struct for partial profile updates; `None` fields are left
/// untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileChangeset<'a> {
    pub display_name: Option<&'a str>,
    pub username: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Habit models
// ---------------------------------------------------------------------------

/// Row struct for reading from the habits table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = habits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HabitRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub emoji: String,
    pub active: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new habit records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = habits)]
pub(crate) struct NewHabitRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: &'a str,
    pub emoji: &'a str,
    pub active: bool,
    pub position: i32,
}

/// Changeset struct for reconciliation merges; the position is only
/// written when the import record carried one.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = habits)]
pub(crate) struct HabitImportChangeset<'a> {
    pub emoji: &'a str,
    pub position: Option<i32>,
}

// ---------------------------------------------------------------------------
// Habit entry models
// ---------------------------------------------------------------------------

/// Row struct for reading from the habit_entries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = habit_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HabitEntryRow {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub entry_date: NaiveDate,
    pub completed: bool,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new entry records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = habit_entries)]
pub(crate) struct NewHabitEntryRow {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub entry_date: NaiveDate,
    pub completed: bool,
}

// ---------------------------------------------------------------------------
// Journal models
// ---------------------------------------------------------------------------

/// Row struct for reading from the journals table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = journals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct JournalRow {
    #[expect(dead_code, reason = "journals are addressed by (user_id, entry_date)")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_date: NaiveDate,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new journal records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = journals)]
pub(crate) struct NewJournalRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_date: NaiveDate,
    pub body: &'a str,
}
