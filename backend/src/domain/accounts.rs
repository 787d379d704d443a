//! Account service: credential registration, login, and profile updates.
//!
//! The identity-provider side of authentication lives outside this crate;
//! whatever flow authenticates a user ends in the session boundary storing
//! a [`UserId`]. This module covers the credential path: bcrypt-hashed
//! passwords, unique username generation, and profile edits.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{
    LoginService, NewUserRecord, PasswordHasher, PasswordHasherError, ProfileCommand,
    ProfileQuery, ProfileUpdateRequest, RegistrationCommand, RegistrationRequest,
    UserRepository, UserRepositoryError,
};
use crate::domain::user::{DisplayName, EmailAddress, UserId, UserProfile, Username, USERNAME_MAX};
use crate::domain::Error;

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN: usize = 8;

/// Upper bound on the suffix search when generating a unique username.
const USERNAME_ATTEMPTS: u32 = 1000;

/// Validation errors for [`LoginCredentials`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    EmptyEmail,
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Login credentials as submitted: shape-checked only.
///
/// The email is kept raw here; a malformed address simply fails the lookup
/// so login rejections stay indistinguishable.
#[derive(Clone)]
pub struct LoginCredentials {
    email: String,
    password: String,
}

impl LoginCredentials {
    /// Validate that both parts are present.
    pub fn try_from_parts(
        email: &str,
        password: &str,
    ) -> Result<Self, LoginValidationError> {
        if email.trim().is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: email.trim().to_owned(),
            password: password.to_owned(),
        })
    }

    /// The submitted email, trimmed.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The submitted password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never echo the password, even in debug logs.
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Account service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService<U, P> {
    users: Arc<U>,
    hasher: Arc<P>,
}

impl<U, P> AccountService<U, P> {
    /// Create a new service over the user store and password hasher.
    pub fn new(users: Arc<U>, hasher: Arc<P>) -> Self {
        Self { users, hasher }
    }
}

fn map_user_repo_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail => Error::conflict("email already registered")
            .with_details(json!({ "field": "email", "code": "duplicate_email" })),
        UserRepositoryError::DuplicateUsername => Error::conflict("username already taken")
            .with_details(json!({ "field": "username", "code": "duplicate_username" })),
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    let PasswordHasherError::Hash { message } = error;
    Error::internal(format!("password hashing failed: {message}"))
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

/// Reduce a seed to the username alphabet, leaving room for a numeric
/// suffix within [`USERNAME_MAX`].
fn sanitise_username_seed(raw: &str) -> String {
    let mut seed: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    if seed.is_empty() {
        seed.push_str("user");
    }
    seed.truncate(USERNAME_MAX - 4);
    seed
}

impl<U, P> AccountService<U, P>
where
    U: UserRepository,
    P: PasswordHasher,
{
    /// Find the first free handle: `seed`, then `seed1`, `seed2`, …
    async fn generate_username(&self, seed: &str) -> Result<Username, Error> {
        let base = sanitise_username_seed(seed);
        let mut candidate = base.clone();
        for counter in 1..=USERNAME_ATTEMPTS {
            let username = Username::new(&candidate)
                .map_err(|err| Error::internal(format!("generated username invalid: {err}")))?;
            let taken = self
                .users
                .username_exists(&username)
                .await
                .map_err(map_user_repo_error)?;
            if !taken {
                return Ok(username);
            }
            candidate = format!("{base}{counter}");
        }
        Err(Error::internal("could not allocate a unique username"))
    }
}

#[async_trait]
impl<U, P> RegistrationCommand for AccountService<U, P>
where
    U: UserRepository,
    P: PasswordHasher,
{
    async fn register(&self, request: RegistrationRequest) -> Result<UserProfile, Error> {
        let RegistrationRequest {
            email,
            password,
            username,
            display_name,
        } = request;

        if password.chars().count() < PASSWORD_MIN {
            return Err(Error::invalid_request(format!(
                "password must be at least {PASSWORD_MIN} characters"
            ))
            .with_details(json!({ "field": "password", "code": "password_too_short" })));
        }

        let username = match username {
            Some(username) => {
                let taken = self
                    .users
                    .username_exists(&username)
                    .await
                    .map_err(map_user_repo_error)?;
                if taken {
                    return Err(map_user_repo_error(UserRepositoryError::DuplicateUsername));
                }
                username
            }
            None => {
                let seed = display_name
                    .as_ref()
                    .map(DisplayName::as_str)
                    .map(ToOwned::to_owned)
                    .unwrap_or_else(|| local_part(&email));
                self.generate_username(&seed).await?
            }
        };

        let display_name = match display_name {
            Some(name) => name,
            None => DisplayName::new(username.as_str())
                .map_err(|err| Error::internal(format!("derived display name invalid: {err}")))?,
        };

        let password_hash = self.hasher.hash(&password).map_err(map_hasher_error)?;

        let profile = self
            .users
            .insert(NewUserRecord {
                email,
                username,
                display_name,
                password_hash,
            })
            .await
            .map_err(map_user_repo_error)?;
        debug!(user_id = %profile.id, "account registered");
        Ok(profile)
    }
}

/// The local part of an email address, as a username seed.
fn local_part(email: &EmailAddress) -> String {
    email
        .as_str()
        .split('@')
        .next()
        .unwrap_or_default()
        .to_owned()
}

#[async_trait]
impl<U, P> LoginService for AccountService<U, P>
where
    U: UserRepository,
    P: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserProfile, Error> {
        let Ok(email) = EmailAddress::new(credentials.email()) else {
            return Err(invalid_credentials());
        };

        let Some(account) = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_repo_error)?
        else {
            return Err(invalid_credentials());
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .map_err(map_hasher_error)?;
        if !matches {
            return Err(invalid_credentials());
        }
        Ok(account.profile)
    }
}

#[async_trait]
impl<U, P> ProfileCommand for AccountService<U, P>
where
    U: UserRepository,
    P: PasswordHasher,
{
    async fn update(&self, request: ProfileUpdateRequest) -> Result<UserProfile, Error> {
        let ProfileUpdateRequest {
            user_id,
            display_name,
            username,
        } = request;

        if display_name.is_none() && username.is_none() {
            return Err(Error::invalid_request("no changes requested"));
        }

        if let Some(username) = &username {
            let taken = self
                .users
                .username_taken_by_other(username, &user_id)
                .await
                .map_err(map_user_repo_error)?;
            if taken {
                return Err(map_user_repo_error(UserRepositoryError::DuplicateUsername));
            }
        }

        self.users
            .update_profile(&user_id, display_name.as_ref(), username.as_ref())
            .await
            .map_err(map_user_repo_error)
    }
}

#[async_trait]
impl<U, P> ProfileQuery for AccountService<U, P>
where
    U: UserRepository,
    P: PasswordHasher,
{
    async fn fetch(&self, user_id: &UserId) -> Result<UserProfile, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}
