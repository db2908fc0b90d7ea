use std::fmt;

use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

/// An Argon2 PHC string. Only `hash_secret` can build one, so a plaintext
/// secret never reaches a store and a hash is never hashed again.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretHash(String);

impl SecretHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretHash(..)")
    }
}

pub fn hash_secret(plain: &str) -> anyhow::Result<SecretHash> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(SecretHash(hash))
}

pub fn verify_secret(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

lazy_static! {
    /// Stand-in hash verified when an identifier is unknown, so that path
    /// costs one Argon2 verification like a wrong secret does.
    static ref DUMMY_HASH: Option<SecretHash> = hash_secret("dummy-secret-for-timing").ok();
}

/// Runs a verification that always fails. Returns `false`.
pub fn verify_dummy(plain: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_ref() {
        let _ = verify_secret(plain, hash.as_str());
    }
    false
}

/// `verify_dummy` on the blocking pool.
pub async fn verify_dummy_blocking(plain: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_dummy(&plain))
        .await
        .context("verification task failed")
}

/// `hash_secret` on the blocking pool.
pub async fn hash_secret_blocking(plain: String) -> anyhow::Result<SecretHash> {
    tokio::task::spawn_blocking(move || hash_secret(&plain))
        .await
        .context("hashing task failed")?
}

/// `verify_secret` on the blocking pool.
pub async fn verify_secret_blocking(plain: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_secret(&plain, &hash))
        .await
        .context("verification task failed")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let pin = "4821";
        let hash = hash_secret(pin).expect("hashing should succeed");
        assert_ne!(hash.as_str(), pin);
        assert!(hash.as_str().starts_with("$argon2"));
        assert!(verify_secret(pin, hash.as_str()).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let hash = hash_secret("correct-horse-battery-staple").expect("hashing should succeed");
        assert!(!verify_secret("wrong-password", hash.as_str()).expect("verify should not error"));
    }

    #[test]
    fn same_secret_gets_fresh_salt() {
        let a = hash_secret("123456").unwrap();
        let b = hash_secret("123456").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_secret("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn debug_does_not_leak_hash() {
        let hash = hash_secret("9999").unwrap();
        assert_eq!(format!("{hash:?}"), "SecretHash(..)");
    }

    #[test]
    fn dummy_verification_never_matches() {
        assert!(!verify_dummy("dummy-secret-for-timing"));
        assert!(!verify_dummy("4321"));
        assert!(DUMMY_HASH.is_some());
    }

    #[tokio::test]
    async fn blocking_wrappers_agree() {
        let hash = hash_secret_blocking("2468".into()).await.unwrap();
        assert!(verify_secret_blocking("2468".into(), hash.into_string()).await.unwrap());
    }
}
