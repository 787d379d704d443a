//! bcrypt adapter for the password hasher port.

use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// bcrypt-backed implementation of the password hasher port.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Create a hasher with the library's default cost factor.
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Create a hasher with an explicit cost factor. Tests use the minimum
    /// cost to keep hashing fast.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHasherError> {
        bcrypt::hash(password, self.cost).map_err(|err| PasswordHasherError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHasherError> {
        bcrypt::verify(password, hash).map_err(|err| PasswordHasherError::hash(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // Minimum bcrypt cost keeps the round trips fast under test.
    fn fast_hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::with_cost(4)
    }

    #[rstest]
    fn hash_then_verify_round_trips() {
        let hasher = fast_hasher();
        let hash = hasher.hash("correct horse").expect("hashing succeeds");

        assert!(hasher.verify("correct horse", &hash).expect("verify runs"));
        assert!(!hasher.verify("wrong horse", &hash).expect("verify runs"));
    }

    #[rstest]
    fn hashes_are_salted() {
        let hasher = fast_hasher();
        let first = hasher.hash("correct horse").expect("hashing succeeds");
        let second = hasher.hash("correct horse").expect("hashing succeeds");
        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_hash_is_an_error() {
        let hasher = fast_hasher();
        assert!(hasher.verify("anything", "not-a-bcrypt-hash").is_err());
    }
}
