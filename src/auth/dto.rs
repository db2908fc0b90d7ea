use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::claims::Role;
use crate::users::dto::string_or_number;

/// Request body for user login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub mobile_number: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub mpin: Option<String>,
}

/// Request body for admin login.
#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Result of a successful credential check.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub subject_id: Uuid,
    pub identifier: String,
    pub token: String,
    pub expires_in_seconds: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedInUser {
    pub id: Uuid,
    pub mobile_number: String,
}

#[derive(Debug, Serialize)]
pub struct LoggedInAdmin {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<LoggedInUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<LoggedInAdmin>,
    pub token: String,
    pub expires_in: u64,
}

/// Body of `GET /me`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSubject {
    pub subject_id: Uuid,
    pub identifier: String,
    pub role: Role,
}
