use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::repo_types::{AdminRecord, NewAdmin};
use crate::{
    auth::password::hash_secret_blocking, config::AdminSeed, error::AppError, state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register_admin(
    st: &AppState,
    email: &str,
    password: &str,
) -> Result<AdminRecord, AppError> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid admin email");
        return Err(AppError::validation("Invalid email"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation("Password too short"));
    }

    let password_hash = hash_secret_blocking(password.to_string()).await?;
    let admin = st
        .admins
        .create(NewAdmin {
            email,
            password_hash,
        })
        .await?;
    info!(admin_id = %admin.id, email = %admin.email, "admin created");
    Ok(admin)
}

/// Creates the configured admin unless one with that email exists.
/// Returns whether an admin was created.
pub async fn ensure_admin(st: &AppState, seed: &AdminSeed) -> Result<bool, AppError> {
    if st
        .admins
        .find_by_email(&normalize_email(&seed.email))
        .await?
        .is_some()
    {
        info!("seed admin already present");
        return Ok(false);
    }
    register_admin(st, &seed.email, &seed.password).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_secret;

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("ops@example.com"));
        assert!(!is_valid_email("ops@example"));
        assert!(!is_valid_email("ops example@x.io"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn register_normalizes_and_hashes() {
        let st = AppState::fake();
        let admin = register_admin(&st, "  Ops@Example.COM ", "s3cure-enough").await.unwrap();
        assert_eq!(admin.email, "ops@example.com");
        assert_ne!(admin.password_hash, "s3cure-enough");
        assert!(verify_secret("s3cure-enough", &admin.password_hash).unwrap());
    }

    #[tokio::test]
    async fn register_rejects_bad_input_and_duplicates() {
        let st = AppState::fake();
        assert!(matches!(
            register_admin(&st, "not-an-email", "s3cure-enough").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            register_admin(&st, "ops@example.com", "short").await,
            Err(AppError::Validation(_))
        ));

        register_admin(&st, "ops@example.com", "s3cure-enough").await.unwrap();
        assert!(matches!(
            register_admin(&st, "OPS@example.com", "another-pass").await,
            Err(AppError::DuplicateKey(_))
        ));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let st = AppState::fake();
        let seed = AdminSeed {
            email: "root@example.com".into(),
            password: "bootstrap-pass".into(),
        };
        assert!(ensure_admin(&st, &seed).await.unwrap());
        assert!(!ensure_admin(&st, &seed).await.unwrap());
    }
}
