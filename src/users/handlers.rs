use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;

use super::{
    dto::{
        DashboardStats, ListUsersQuery, RegisterRequest, RegisteredUser, UpdateStatusRequest,
        UserDetails, UserProfile,
    },
    repo_types::ActiveFilter,
    services,
};
use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: RegisteredUser,
}

#[derive(Debug, Serialize)]
pub struct DetailsResponse {
    pub success: bool,
    pub user: UserDetails,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub users: Vec<UserProfile>,
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/viewdetails/:national_id", get(view_details))
        .route("/users", get(list_users))
        .route("/users/update-status", put(update_status))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(dashboard_stats))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let Json(payload) = payload?;
    let user = services::register_user(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully",
            user,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn view_details(
    State(state): State<AppState>,
    Path(national_id): Path<String>,
) -> Result<Json<DetailsResponse>, AppError> {
    let user = services::get_user_details(&state, &national_id).await?;
    Ok(Json(DetailsResponse {
        success: true,
        user,
    }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<Json<ListResponse>, AppError> {
    let Query(query) = query?;
    let users = services::list_users(&state, ActiveFilter::from(query.is_active)).await?;
    Ok(Json(ListResponse {
        success: true,
        count: users.len(),
        users,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let Json(payload) = payload?;
    let (Some(mobile_number), Some(is_active)) = (payload.mobile_number, payload.is_active) else {
        return Err(AppError::validation("Mobile number and isActive are required"));
    };

    let user = services::set_active_flag(&state, &mobile_number, is_active).await?;
    Ok(Json(StatusResponse {
        success: true,
        message: if is_active {
            "User Activated"
        } else {
            "User Deactivated"
        },
        user,
    }))
}

#[instrument(skip(state))]
pub async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(services::dashboard_stats(&state).await?))
}
