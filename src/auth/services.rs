use axum::extract::FromRef;
use tracing::{info, warn};

use super::{
    claims::Role,
    dto::LoginOutcome,
    jwt::JwtKeys,
    password::{verify_dummy_blocking, verify_secret_blocking},
};
use crate::{admins::services::normalize_email, error::AppError, state::AppState};

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn issue(
    st: &AppState,
    subject_id: uuid::Uuid,
    identifier: String,
    role: Role,
) -> Result<LoginOutcome, AppError> {
    let keys = JwtKeys::from_ref(st);
    let token = keys.sign(subject_id, &identifier, role)?;
    Ok(LoginOutcome {
        subject_id,
        identifier,
        token,
        expires_in_seconds: keys.ttl_seconds(),
    })
}

/// Checks run existence, then active flag, then MPIN. An inactive account is
/// reported as such even when the MPIN is wrong.
pub async fn login_user(
    st: &AppState,
    mobile_number: Option<String>,
    mpin: Option<String>,
) -> Result<LoginOutcome, AppError> {
    let (Some(mobile_number), Some(mpin)) = (present(mobile_number), present(mpin)) else {
        return Err(AppError::validation("Mobile number and MPIN are required"));
    };

    let Some(user) = st.users.find_by_mobile(&mobile_number).await? else {
        verify_dummy_blocking(mpin).await?;
        warn!(mobile = %mobile_number, "login unknown mobile number");
        return Err(AppError::InvalidCredentials);
    };

    if !user.is_active {
        warn!(user_id = %user.id, "login on inactive account");
        return Err(AppError::AccountInactive);
    }

    if !verify_secret_blocking(mpin, user.pin_hash).await? {
        warn!(user_id = %user.id, "login invalid mpin");
        return Err(AppError::InvalidCredentials);
    }

    let outcome = issue(st, user.id, user.mobile_number, Role::User)?;
    info!(user_id = %outcome.subject_id, "user logged in");
    Ok(outcome)
}

pub async fn login_admin(
    st: &AppState,
    email: Option<String>,
    password: Option<String>,
) -> Result<LoginOutcome, AppError> {
    let (Some(email), Some(password)) = (present(email), password.filter(|p| !p.is_empty()))
    else {
        return Err(AppError::validation("Email and password are required"));
    };
    let email = normalize_email(&email);

    let Some(admin) = st.admins.find_by_email(&email).await? else {
        verify_dummy_blocking(password).await?;
        warn!(email = %email, "admin login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_secret_blocking(password, admin.password_hash).await? {
        warn!(admin_id = %admin.id, "admin login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let outcome = issue(st, admin.id, admin.email, Role::Admin)?;
    info!(admin_id = %outcome.subject_id, "admin logged in");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        admins::services::register_admin,
        users::{dto::RegisterRequest, services::register_user},
    };

    async fn seed_user(st: &AppState, mobile: &str, national_id: &str, active: bool) {
        register_user(
            st,
            RegisterRequest {
                name: Some("Kiran".into()),
                mobile_number: Some(mobile.into()),
                mpin: Some("2580".into()),
                date_of_birth: Some("1985-02-01".into()),
                national_id: Some(national_id.into()),
                is_active: Some(active),
                ..RegisterRequest::default()
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn active_user_gets_day_long_token() {
        let st = AppState::fake();
        seed_user(&st, "9123456780", "111122223333", true).await;

        let outcome = login_user(&st, Some("9123456780".into()), Some("2580".into()))
            .await
            .unwrap();
        assert_eq!(outcome.expires_in_seconds, 86_400);
        assert_eq!(outcome.identifier, "9123456780");

        let claims = JwtKeys::from_ref(&st).verify(&outcome.token).unwrap();
        assert_eq!(claims.identifier, "9123456780");
        assert_eq!(claims.sub, outcome.subject_id);
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn inactive_account_wins_over_wrong_pin() {
        let st = AppState::fake();
        seed_user(&st, "9123456780", "111122223333", false).await;

        let right = login_user(&st, Some("9123456780".into()), Some("2580".into())).await;
        assert!(matches!(right, Err(AppError::AccountInactive)));

        let wrong = login_user(&st, Some("9123456780".into()), Some("0000".into())).await;
        assert!(matches!(wrong, Err(AppError::AccountInactive)));
    }

    #[tokio::test]
    async fn unknown_mobile_and_wrong_pin_look_the_same() {
        let st = AppState::fake();
        seed_user(&st, "9123456780", "111122223333", true).await;

        let unknown = login_user(&st, Some("9000000000".into()), Some("2580".into()))
            .await
            .unwrap_err();
        let wrong = login_user(&st, Some("9123456780".into()), Some("1111".into()))
            .await
            .unwrap_err();
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.code(), wrong.code());
    }

    #[tokio::test]
    async fn missing_fields_are_validation_errors() {
        let st = AppState::fake();
        let err = login_user(&st, None, Some("1234".into())).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = login_admin(&st, Some(" ".into()), Some("pw".into())).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn admin_login_normalizes_email() {
        let st = AppState::fake();
        register_admin(&st, "ops@example.com", "s3cure-enough").await.unwrap();

        let outcome = login_admin(&st, Some(" OPS@example.com".into()), Some("s3cure-enough".into()))
            .await
            .unwrap();
        assert_eq!(outcome.identifier, "ops@example.com");
        assert_eq!(outcome.expires_in_seconds, 86_400);
        let claims = JwtKeys::from_ref(&st).verify(&outcome.token).unwrap();
        assert_eq!(claims.role, Role::Admin);

        let err = login_admin(&st, Some("ops@example.com".into()), Some("nope-nope".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        let err = login_admin(&st, Some("who@example.com".into()), Some("s3cure-enough".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }
}
