use std::sync::OnceLock;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{Error, Result};

pub const MIN_PASSWORD_LEN: usize = 6;

const DECOY_PASSWORD: &str = "decoy-password-never-matches";

/// One-way hashing of user passwords with Argon2id.
///
/// Hashes are PHC strings, so the salt and parameters travel with the hash and
/// a vault built with different parameters can still verify them.
pub struct PasswordVault {
    argon2: Argon2<'static>,
    /// Hash checked when no account matches, so a miss costs a full verify.
    decoy: OnceLock<String>,
}

impl Default for PasswordVault {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordVault {
    #[must_use]
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
            decoy: OnceLock::new(),
        }
    }

    /// Builds a vault with explicit Argon2id cost parameters.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| Error::Config(format!("invalid argon2 params: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy: OnceLock::new(),
        })
    }

    /// Hashes a plaintext password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        if plaintext.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::invalid_field(
                "password",
                format!("Shorter than minimum length {MIN_PASSWORD_LEN}."),
            ));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| Error::Internal(format!("failed to hash password: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored hash. The derived keys
    /// are compared in constant time by the argon2 crate.
    pub fn verify(&self, plaintext: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| Error::Internal(format!("invalid hash format: {e}")))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Internal(format!("failed to verify password: {e}"))),
        }
    }

    /// Verifies against `stored`, or against a decoy hash when there is none.
    /// A missing hash always fails but takes as long as a wrong password.
    pub fn verify_or_decoy(&self, plaintext: &str, stored: Option<&str>) -> Result<bool> {
        match stored {
            Some(hash) => self.verify(plaintext, hash),
            None => {
                self.verify(plaintext, self.decoy()?)?;
                Ok(false)
            }
        }
    }

    fn decoy(&self) -> Result<&str> {
        if let Some(hash) = self.decoy.get() {
            return Ok(hash);
        }
        let hash = self.hash(DECOY_PASSWORD)?;
        Ok(self.decoy.get_or_init(|| hash))
    }

    #[cfg(test)]
    pub(crate) fn decoy_used(&self) -> bool {
        self.decoy.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> PasswordVault {
        PasswordVault::with_params(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let vault = vault();
        let hash = vault.hash("secure123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(vault.verify("secure123", &hash).unwrap());
        assert!(!vault.verify("secure124", &hash).unwrap());
    }

    #[test]
    fn test_identical_inputs_hash_differently() {
        let vault = vault();
        let first = vault.hash("secure123").unwrap();
        let second = vault.hash("secure123").unwrap();

        assert_ne!(first, second);
        assert!(vault.verify("secure123", &first).unwrap());
        assert!(vault.verify("secure123", &second).unwrap());
    }

    #[test]
    fn test_short_password_rejected() {
        let result = vault().hash("short");
        match result {
            Err(Error::Validation(errors)) => {
                assert_eq!(errors["password"], vec!["Shorter than minimum length 6."]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_hash_verifies_across_parameter_sets() {
        let hash = vault().hash("secure123").unwrap();
        let other = PasswordVault::with_params(2048, 2, 1).unwrap();
        assert!(other.verify("secure123", &hash).unwrap());
    }

    #[test]
    fn test_missing_hash_runs_decoy_and_fails() {
        let vault = vault();
        assert!(!vault.decoy_used());

        assert!(!vault.verify_or_decoy(DECOY_PASSWORD, None).unwrap());
        assert!(vault.decoy_used());
        assert!(vault.decoy.get().unwrap().starts_with("$argon2id$"));

        let hash = vault.hash("secure123").unwrap();
        assert!(vault.verify_or_decoy("secure123", Some(&hash)).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_internal_error() {
        assert!(matches!(
            vault().verify("secure123", "not-a-hash"),
            Err(Error::Internal(_))
        ));
    }
}
