//! Password hashing and verification

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::{
    config::CredentialsConfig,
    error::{AppError, AppResult},
};

const DUMMY_PASSWORD: &str = "biblio-timing-equalizer";

/// Argon2id hashing with per-call random salts.
///
/// Hashes are PHC strings, so verification reads salt and cost parameters
/// from the hash itself and keeps working after the configured costs change.
#[derive(Clone)]
pub struct CredentialService {
    argon2: Argon2<'static>,
    /// Hash verified when a login names an unknown email
    dummy_hash: String,
}

impl CredentialService {
    pub fn new(config: &CredentialsConfig) -> AppResult<Self> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AppError::Internal(format!("Invalid Argon2 parameters: {}", e)))?;

        let mut service = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash: String::new(),
        };
        service.dummy_hash = service.hash(DUMMY_PASSWORD)?;
        Ok(service)
    }

    /// Hash a password using Argon2
    pub fn hash(&self, plaintext: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash
    pub fn verify(&self, plaintext: &str, hashed: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hashed)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::Internal(format!("Failed to verify password: {}", e))),
        }
    }

    /// Spend one verification's worth of work and always fail
    pub fn verify_dummy(&self, plaintext: &str) -> AppResult<bool> {
        self.verify(plaintext, &self.dummy_hash)?;
        Ok(false)
    }

    /// [`hash`](Self::hash) on the blocking pool
    pub async fn spawn_hash(&self, plaintext: String) -> AppResult<String> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.hash(&plaintext))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
    }

    /// [`verify`](Self::verify) on the blocking pool
    pub async fn spawn_verify(&self, plaintext: String, hashed: String) -> AppResult<bool> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify(&plaintext, &hashed))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
    }

    /// [`verify_dummy`](Self::verify_dummy) on the blocking pool
    pub async fn spawn_verify_dummy(&self, plaintext: String) -> AppResult<bool> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify_dummy(&plaintext))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> CredentialsConfig {
    CredentialsConfig {
        memory_kib: 256,
        iterations: 1,
        parallelism: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CredentialService {
        CredentialService::new(&test_config()).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let credentials = service();
        let hash = credentials.hash("secret").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("secret"));
        assert!(credentials.verify("secret", &hash).unwrap());
        assert!(!credentials.verify("Secret", &hash).unwrap());
        assert!(!credentials.verify("", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let credentials = service();
        let first = credentials.hash("secret").unwrap();
        let second = credentials.hash("secret").unwrap();

        assert_ne!(first, second);
        assert!(credentials.verify("secret", &first).unwrap());
        assert!(credentials.verify("secret", &second).unwrap());
    }

    #[test]
    fn test_verify_with_other_parameters() {
        let hash = service().hash("secret").unwrap();
        let stronger = CredentialService::new(&CredentialsConfig {
            memory_kib: 512,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();

        assert!(stronger.verify("secret", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        let err = service().verify("secret", "plaintext-in-db").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_verify_dummy_always_fails() {
        let credentials = service();
        assert!(!credentials.verify_dummy(DUMMY_PASSWORD).unwrap());
        assert!(!credentials.verify_dummy("anything").unwrap());
    }

    #[test]
    fn test_invalid_parameters() {
        let config = CredentialsConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(CredentialService::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_spawned_round_trip() {
        let credentials = service();
        let hash = credentials.spawn_hash("secret".to_string()).await.unwrap();
        assert!(credentials.spawn_verify("secret".to_string(), hash.clone()).await.unwrap());
        assert!(!credentials.spawn_verify("wrong".to_string(), hash).await.unwrap());
    }
}
