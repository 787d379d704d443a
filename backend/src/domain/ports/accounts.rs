//! Driving ports for registration, login, and profile management.

use async_trait::async_trait;

use crate::domain::accounts::LoginCredentials;
use crate::domain::user::{DisplayName, EmailAddress, UserId, UserProfile, Username};
use crate::domain::Error;

/// Request to create a credential account.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Normalised email address.
    pub email: EmailAddress,
    /// Plaintext password; hashed before storage.
    pub password: String,
    /// Desired handle, or `None` to generate a unique one.
    pub username: Option<Username>,
    /// Display name, or `None` to derive one from the handle.
    pub display_name: Option<DisplayName>,
}

/// Request to update the caller's profile.
#[derive(Debug, Clone)]
pub struct ProfileUpdateRequest {
    /// Authenticated caller.
    pub user_id: UserId,
    /// New display name, when changing it.
    pub display_name: Option<DisplayName>,
    /// New handle, when changing it; uniqueness is checked against every
    /// other account.
    pub username: Option<Username>,
}

/// Domain use-case port for account creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationCommand: Send + Sync {
    /// Create an account, generating a unique username when none is given.
    async fn register(&self, request: RegistrationRequest) -> Result<UserProfile, Error>;
}

/// Domain use-case port for credential authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated profile.
    ///
    /// Unknown email and wrong password are indistinguishable to callers.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserProfile, Error>;
}

/// Domain use-case port for profile updates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Apply the requested profile changes.
    async fn update(&self, request: ProfileUpdateRequest) -> Result<UserProfile, Error>;
}

/// Domain use-case port for reading the caller's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Fetch the profile backing the current session.
    async fn fetch(&self, user_id: &UserId) -> Result<UserProfile, Error>;
}
