//! Port for credential hashing.
//!
//! Hashing is CPU-bound rather than I/O-bound, so unlike the repository
//! ports this trait is synchronous; the adapter picks the cost factor.

/// Errors raised by password hasher adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHasherError {
    /// Hashing or verification failed inside the backing implementation.
    #[error("password hashing failed: {message}")]
    Hash { message: String },
}

impl PasswordHasherError {
    /// Create a hashing error with the given message.
    pub fn hash(message: impl Into<String>) -> Self {
        Self::Hash {
            message: message.into(),
        }
    }
}

/// Port for hashing and verifying login passwords.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password for storage.
    fn hash(&self, password: &str) -> Result<String, PasswordHasherError>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHasherError>;
}
