use serde::{Deserialize, Deserializer, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::repo_types::{Address, UserRecord};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Accepts `"9876543210"` as well as `9876543210` for numeric identifiers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(u64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    }))
}

/// Address as clients send it: the current structured form or a legacy free-text line.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AddressInput {
    Text(String),
    Structured(Address),
}

impl AddressInput {
    /// Canonical form; blank input means no address.
    pub fn into_address(self) -> Option<Address> {
        let address = match self {
            AddressInput::Text(line) => Address {
                street: line.trim().to_string(),
                ..Address::default()
            },
            AddressInput::Structured(a) => Address {
                street: a.street.trim().to_string(),
                city: a.city.trim().to_string(),
                state: a.state.trim().to_string(),
                postal_code: a.postal_code.trim().to_string(),
            },
        };
        (!address.is_blank()).then_some(address)
    }
}

/// Request body for `POST /register`. Everything is optional here so a
/// missing field is reported as a validation failure, not a parse error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub mobile_number: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub mpin: Option<String>,
    pub date_of_birth: Option<String>,
    #[serde(default, alias = "aadharnumber", deserialize_with = "string_or_number")]
    pub national_id: Option<String>,
    pub address: Option<AddressInput>,
    #[serde(alias = "isactive")]
    pub is_active: Option<bool>,
    #[serde(alias = "totalbottles")]
    pub total_bottles: Option<u32>,
    #[serde(alias = "remainingbottles")]
    pub remaining_bottles: Option<u32>,
    pub weight: Option<f64>,
}

/// Redacted projection returned after registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: Uuid,
    pub name: String,
    pub mobile_number: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expiry_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&UserRecord> for RegisteredUser {
    fn from(u: &UserRecord) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            mobile_number: u.mobile_number.clone(),
            expiry_date: u.expiry_date,
            created_at: u.created_at,
        }
    }
}

/// Public view of a user. Carries no credential material.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub mobile_number: String,
    pub national_id: String,
    pub address: Option<Address>,
    #[serde(with = "iso_date::option")]
    pub date_of_birth: Option<Date>,
    pub weight: Option<f64>,
    pub is_active: bool,
    pub total_bottles: i32,
    pub remaining_bottles: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub expiry_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<UserRecord> for UserProfile {
    fn from(u: UserRecord) -> Self {
        Self {
            id: u.id,
            name: u.name,
            mobile_number: u.mobile_number,
            national_id: u.national_id,
            address: u.address,
            date_of_birth: u.date_of_birth,
            weight: u.weight,
            is_active: u.is_active,
            total_bottles: u.total_bottles,
            remaining_bottles: u.remaining_bottles,
            expiry_date: u.expiry_date,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Advisory tier derived from cumulative bottle consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthRecommendation {
    #[serde(rename = "healthy")]
    Healthy,
    #[serde(rename = "moderate, monitor")]
    Moderate,
    #[serde(rename = "high, reduce")]
    High,
    #[serde(rename = "excessive, risk")]
    Excessive,
}

impl HealthRecommendation {
    /// Upper bounds are inclusive: 2, 5 and 8 belong to the lower tier.
    pub fn for_bottles(total_bottles: i32) -> Self {
        match total_bottles {
            i32::MIN..=2 => HealthRecommendation::Healthy,
            3..=5 => HealthRecommendation::Moderate,
            6..=8 => HealthRecommendation::High,
            _ => HealthRecommendation::Excessive,
        }
    }
}

/// `UserProfile` plus the non-persisted fields shown on the details page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(with = "time::serde::rfc3339")]
    pub renewal_date: OffsetDateTime,
    pub health_recommendation: HealthRecommendation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub mobile_number: Option<String>,
    #[serde(alias = "isactive")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    #[serde(alias = "isactive")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub active_users: u64,
    pub pending_applications: u64,
}
