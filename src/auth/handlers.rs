use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{
        AdminLoginRequest, CurrentSubject, LoggedInAdmin, LoggedInUser, LoginRequest,
        LoginResponse,
    },
    jwt::AuthSubject,
    services::{login_admin, login_user},
};
use crate::{error::AppError, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/admin/login", post(admin_login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(payload) = payload?;
    let outcome = login_user(&state, payload.mobile_number, payload.mpin).await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful",
        user: Some(LoggedInUser {
            id: outcome.subject_id,
            mobile_number: outcome.identifier,
        }),
        admin: None,
        token: outcome.token,
        expires_in: outcome.expires_in_seconds,
    }))
}

#[instrument(skip(state, payload))]
pub async fn admin_login(
    State(state): State<AppState>,
    payload: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(payload) = payload?;
    let outcome = login_admin(&state, payload.email, payload.password).await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Admin login successful",
        user: None,
        admin: Some(LoggedInAdmin {
            id: outcome.subject_id,
            email: outcome.identifier,
        }),
        token: outcome.token,
        expires_in: outcome.expires_in_seconds,
    }))
}

#[instrument(skip_all)]
pub async fn get_me(AuthSubject(claims): AuthSubject) -> Json<CurrentSubject> {
    Json(CurrentSubject {
        subject_id: claims.sub,
        identifier: claims.identifier,
        role: claims.role,
    })
}

#[cfg(test)]
mod me_tests {
    use super::*;
    use crate::auth::claims::Role;

    #[test]
    fn current_subject_serialization() {
        let response = CurrentSubject {
            subject_id: uuid::Uuid::new_v4(),
            identifier: "9876543210".to_string(),
            role: Role::User,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["identifier"], "9876543210");
        assert_eq!(json["role"], "user");
        assert!(json.get("subjectId").is_some());
    }
}
