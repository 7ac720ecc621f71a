use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use commons_core::ports::{AuthError, PasswordService};

/// Argon2id password hashing with a random salt per hash.
#[derive(Default)]
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        // Profiles imported without a password can never sign in
        if hash.is_empty() {
            return Ok(false);
        }
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let service = Argon2PasswordService::new();
        let hash = service.hash("hunter22").unwrap();

        assert!(service.verify("hunter22", &hash).unwrap());
        assert!(!service.verify("hunter23", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_hashes() {
        let service = Argon2PasswordService::new();
        assert_ne!(service.hash("hunter22").unwrap(), service.hash("hunter22").unwrap());
    }

    #[test]
    fn test_empty_hash_never_verifies() {
        let service = Argon2PasswordService::new();
        assert!(!service.verify("anything", "").unwrap());
    }
}
