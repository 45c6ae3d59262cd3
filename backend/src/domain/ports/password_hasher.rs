//! Port for password hashing.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashers.
    pub enum PasswordHasherError {
        /// The hash could not be computed.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Derives and checks password hashes.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a fresh salt.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Check `password` against a stored hash. Malformed hashes never match.
    fn verify(&self, password: &str, hash: &PasswordHash) -> bool;
}
