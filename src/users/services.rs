use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};
use tracing::{debug, info, warn};

use super::{
    dto::{
        DashboardStats, HealthRecommendation, RegisterRequest, RegisteredUser, UserDetails,
        UserProfile,
    },
    repo_types::{ActiveFilter, Address, NewUser},
};
use crate::{
    auth::password::hash_secret_blocking,
    calendar::{add_months, SUBSCRIPTION_MONTHS},
    error::AppError,
    state::AppState,
};

lazy_static! {
    static ref MPIN_RE: Regex = Regex::new(r"^\d{4,6}$").unwrap();
    static ref MOBILE_RE: Regex = Regex::new(r"^\d{10}$").unwrap();
    static ref NATIONAL_ID_RE: Regex = Regex::new(r"^\d{12}$").unwrap();
}

pub(crate) fn is_valid_mpin(mpin: &str) -> bool {
    MPIN_RE.is_match(mpin)
}

pub(crate) fn is_valid_mobile(mobile: &str) -> bool {
    MOBILE_RE.is_match(mobile)
}

pub(crate) fn is_valid_national_id(id: &str) -> bool {
    NATIONAL_ID_RE.is_match(id)
}

/// A registration that passed every shape check; only uniqueness is left.
#[derive(Debug)]
pub struct ValidRegistration {
    pub name: String,
    pub mobile_number: String,
    pub mpin: String,
    pub date_of_birth: Date,
    pub national_id: String,
    pub address: Option<Address>,
    pub is_active: bool,
    pub total_bottles: i32,
    pub remaining_bottles: i32,
    pub weight: Option<f64>,
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date_of_birth(raw: &str) -> Option<Date> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .or_else(|| OffsetDateTime::parse(raw, &Rfc3339).ok().map(|dt| dt.date()))
}

fn bottles(value: Option<u32>, field: &str) -> Result<i32, AppError> {
    i32::try_from(value.unwrap_or(0))
        .map_err(|_| AppError::validation(format!("{field} is out of range")))
}

/// Checks run in a fixed order and the first failure wins.
pub fn validate_registration(
    req: RegisterRequest,
    today: Date,
) -> Result<ValidRegistration, AppError> {
    let (Some(name), Some(mobile_number), Some(mpin), Some(dob_raw), Some(national_id)) = (
        required(req.name),
        required(req.mobile_number),
        required(req.mpin),
        required(req.date_of_birth),
        required(req.national_id),
    ) else {
        return Err(AppError::validation(
            "Name, mobile number, MPIN, date of birth and national ID are required",
        ));
    };

    if !is_valid_mpin(&mpin) {
        return Err(AppError::validation("MPIN must be 4 to 6 digits"));
    }
    if !is_valid_mobile(&mobile_number) {
        return Err(AppError::validation("Mobile number must be 10 digits"));
    }
    if !is_valid_national_id(&national_id) {
        return Err(AppError::validation("National ID must be 12 digits"));
    }

    let date_of_birth = parse_date_of_birth(&dob_raw)
        .ok_or_else(|| AppError::validation("Date of birth must be a YYYY-MM-DD date"))?;
    if date_of_birth > today {
        return Err(AppError::validation("Date of birth cannot be in the future"));
    }

    if let Some(w) = req.weight {
        if !w.is_finite() || w <= 0.0 {
            return Err(AppError::validation("Weight must be a positive number"));
        }
    }

    Ok(ValidRegistration {
        name,
        mobile_number,
        mpin,
        date_of_birth,
        national_id,
        address: req.address.and_then(|a| a.into_address()),
        is_active: req.is_active.unwrap_or(false),
        total_bottles: bottles(req.total_bottles, "totalBottles")?,
        remaining_bottles: bottles(req.remaining_bottles, "remainingBottles")?,
        weight: req.weight,
    })
}

pub async fn register_user(st: &AppState, req: RegisterRequest) -> Result<RegisteredUser, AppError> {
    register_user_at(st, req, OffsetDateTime::now_utc()).await
}

/// Registration with an explicit clock; `created_at` is `now` and the
/// expiry is exactly three calendar months later.
pub async fn register_user_at(
    st: &AppState,
    req: RegisterRequest,
    now: OffsetDateTime,
) -> Result<RegisteredUser, AppError> {
    let valid = validate_registration(req, now.date())?;

    if st.users.find_by_mobile(&valid.mobile_number).await?.is_some() {
        warn!(mobile = %valid.mobile_number, "mobile number already registered");
        return Err(AppError::DuplicateKey(
            "User with this mobile number already exists".into(),
        ));
    }

    let expiry_date = add_months(now, SUBSCRIPTION_MONTHS).context("compute expiry date")?;
    let pin_hash = hash_secret_blocking(valid.mpin).await?;

    let user = st
        .users
        .create(NewUser {
            mobile_number: valid.mobile_number,
            pin_hash,
            name: valid.name,
            national_id: valid.national_id,
            address: valid.address,
            expiry_date,
            is_active: valid.is_active,
            total_bottles: valid.total_bottles,
            remaining_bottles: valid.remaining_bottles,
            weight: valid.weight,
            date_of_birth: Some(valid.date_of_birth),
            created_at: now,
        })
        .await?;

    info!(user_id = %user.id, mobile = %user.mobile_number, "user registered");
    Ok(RegisteredUser::from(&user))
}

pub async fn get_user_details(st: &AppState, national_id: &str) -> Result<UserDetails, AppError> {
    let national_id = national_id.trim();
    if !is_valid_national_id(national_id) {
        return Err(AppError::validation("National ID must be 12 digits"));
    }

    let user = st
        .users
        .find_by_national_id(national_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let renewal_date =
        add_months(user.expiry_date, SUBSCRIPTION_MONTHS).context("compute renewal date")?;
    let health_recommendation = HealthRecommendation::for_bottles(user.total_bottles);
    debug!(user_id = %user.id, "user details loaded");

    Ok(UserDetails {
        profile: user.into(),
        renewal_date,
        health_recommendation,
    })
}

pub async fn set_active_flag(
    st: &AppState,
    mobile_number: &str,
    is_active: bool,
) -> Result<UserProfile, AppError> {
    let user = st
        .users
        .update_active_flag(mobile_number.trim(), is_active)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::NotFound(_) => AppError::NotFound("User not found".into()),
            other => other,
        })?;
    info!(user_id = %user.id, is_active, "user status updated");
    Ok(user.into())
}

pub async fn list_users(st: &AppState, filter: ActiveFilter) -> Result<Vec<UserProfile>, AppError> {
    let users = st.users.list_all(filter).await?;
    Ok(users.into_iter().map(UserProfile::from).collect())
}

pub async fn dashboard_stats(st: &AppState) -> Result<DashboardStats, AppError> {
    Ok(DashboardStats {
        total_users: st.users.count(ActiveFilter::Any).await?,
        active_users: st.users.count(ActiveFilter::Active).await?,
        pending_applications: st.users.count(ActiveFilter::Inactive).await?,
    })
}
