//! Argon2id implementation of the [`PasswordHasher`] port.
//!
//! Hashes are stored as PHC strings so the parameters and salt travel with
//! the digest; verification reads them back from the stored string.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use tracing::debug;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// Argon2id hasher with configurable cost.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2PasswordHasher {
    /// Hasher using the crate's recommended parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit memory (KiB) and iteration costs.
    ///
    /// Low costs keep tests fast; production keeps the defaults.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, PasswordHasherError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))?;
        Ok(PasswordHash::from_phc(phc.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        let parsed = match PhcHash::new(hash.as_str()) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(error = %err, "stored password hash is malformed");
                return false;
            }
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::with_cost(1024, 1).expect("cheap params")
    }

    #[rstest]
    fn hashes_verify_only_the_original_password(hasher: Argon2PasswordHasher) {
        let hash = hasher.hash("correct horse").expect("hash");
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash));
        assert!(!hasher.verify("battery staple", &hash));
    }

    #[rstest]
    fn salts_differ_between_hashes(hasher: Argon2PasswordHasher) {
        let first = hasher.hash("same password").expect("hash");
        let second = hasher.hash("same password").expect("hash");
        assert_ne!(first.as_str(), second.as_str());
    }

    #[rstest]
    fn malformed_hashes_never_match(hasher: Argon2PasswordHasher) {
        assert!(!hasher.verify("anything", &PasswordHash::from_phc("not-a-phc")));
    }

    #[rstest]
    fn rejects_invalid_cost() {
        assert!(Argon2PasswordHasher::with_cost(0, 0).is_err());
    }
}
