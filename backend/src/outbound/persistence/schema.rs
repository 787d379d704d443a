//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; `diesel
//! print-schema` can regenerate them from a live database when the
//! migrations change.

diesel::table! {
    /// Credential accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Normalised email address; unique.
        email -> Varchar,
        /// Unique account handle.
        username -> Varchar,
        /// Display name shown in the UI.
        display_name -> Varchar,
        /// bcrypt hash of the login password.
        password_hash -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Habits owned by a user.
    habits (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Display name; at most one active habit per name per user.
        name -> Varchar,
        /// Decorative emoji, empty when unset.
        emoji -> Varchar,
        /// Whether the habit appears in the grid.
        active -> Bool,
        /// Display rank among the user's habits.
        position -> Int4,
        /// Record creation timestamp; tie-break for equal positions.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Daily completion records, unique per habit and day.
    habit_entries (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning habit.
        habit_id -> Uuid,
        /// Calendar day the record covers.
        entry_date -> Date,
        /// Completion state.
        completed -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last upsert timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Daily journal notes, unique per user and day.
    journals (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Calendar day the note covers.
        entry_date -> Date,
        /// Free-form note text.
        body -> Text,
        /// Last upsert timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(habits -> users (user_id));
diesel::joinable!(habit_entries -> habits (habit_id));
diesel::joinable!(journals -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, habits, habit_entries, journals);
