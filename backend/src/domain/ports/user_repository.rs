//! Port for account persistence.

use async_trait::async_trait;

use crate::domain::user::{DisplayName, EmailAddress, UserId, UserProfile, Username};

/// Errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
    /// Insert violated the unique email constraint.
    #[error("email address is already registered")]
    DuplicateEmail,
    /// Insert or update violated the unique username constraint.
    #[error("username is already taken")]
    DuplicateUsername,
}

impl UserRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Insert payload for a new credential account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Normalised email address; unique.
    pub email: EmailAddress,
    /// Unique account handle.
    pub username: Username,
    /// Display name shown in the UI.
    pub display_name: DisplayName,
    /// bcrypt hash of the registration password.
    pub password_hash: String,
}

/// Account row as the login flow sees it: profile plus credential hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialUser {
    /// Public account view.
    pub profile: UserProfile,
    /// bcrypt hash to verify the supplied password against.
    pub password_hash: String,
}

/// Port for account storage and uniqueness checks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account; duplicate email or username surfaces as the
    /// corresponding [`UserRepositoryError`] variant.
    async fn insert(&self, record: NewUserRecord) -> Result<UserProfile, UserRepositoryError>;

    /// Look up an account by normalised email, including the credential
    /// hash for password verification.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<CredentialUser>, UserRepositoryError>;

    /// Look up an account by id.
    async fn find_by_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProfile>, UserRepositoryError>;

    /// Whether any account holds this username.
    async fn username_exists(&self, username: &Username) -> Result<bool, UserRepositoryError>;

    /// Whether an account other than `user_id` holds this username.
    async fn username_taken_by_other(
        &self,
        username: &Username,
        user_id: &UserId,
    ) -> Result<bool, UserRepositoryError>;

    /// Update display name and/or username, returning the stored profile.
    async fn update_profile(
        &self,
        user_id: &UserId,
        display_name: Option<&DisplayName>,
        username: Option<&Username>,
    ) -> Result<UserProfile, UserRepositoryError>;
}
