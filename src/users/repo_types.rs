use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::auth::password::SecretHash;

/// Canonical postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, alias = "pincode", alias = "zip")]
    pub postal_code: String,
}

impl Address {
    pub fn is_blank(&self) -> bool {
        [&self.street, &self.city, &self.state, &self.postal_code]
            .iter()
            .all(|part| part.trim().is_empty())
    }
}

/// A subscriber as persisted. `pin_hash` never leaves the crate through a view.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub mobile_number: String,
    pub pin_hash: String,
    pub name: String,
    pub national_id: String,
    pub address: Option<Address>,
    pub expiry_date: OffsetDateTime,
    pub is_active: bool,
    pub total_bottles: i32,
    pub remaining_bottles: i32,
    pub weight: Option<f64>,
    pub date_of_birth: Option<Date>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Everything needed to insert a user; the store only assigns `id`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub mobile_number: String,
    pub pin_hash: SecretHash,
    pub name: String,
    pub national_id: String,
    pub address: Option<Address>,
    pub expiry_date: OffsetDateTime,
    pub is_active: bool,
    pub total_bottles: i32,
    pub remaining_bottles: i32,
    pub weight: Option<f64>,
    pub date_of_birth: Option<Date>,
    pub created_at: OffsetDateTime,
}

impl NewUser {
    pub fn into_record(self, id: Uuid) -> UserRecord {
        UserRecord {
            id,
            mobile_number: self.mobile_number,
            pin_hash: self.pin_hash.into_string(),
            name: self.name,
            national_id: self.national_id,
            address: self.address,
            expiry_date: self.expiry_date,
            is_active: self.is_active,
            total_bottles: self.total_bottles,
            remaining_bottles: self.remaining_bottles,
            weight: self.weight,
            date_of_birth: self.date_of_birth,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Which users a count or listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveFilter {
    #[default]
    Any,
    Active,
    Inactive,
}

impl ActiveFilter {
    pub fn as_flag(self) -> Option<bool> {
        match self {
            ActiveFilter::Any => None,
            ActiveFilter::Active => Some(true),
            ActiveFilter::Inactive => Some(false),
        }
    }

    pub fn matches(self, is_active: bool) -> bool {
        self.as_flag().map_or(true, |flag| flag == is_active)
    }
}

impl From<Option<bool>> for ActiveFilter {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            None => ActiveFilter::Any,
            Some(true) => ActiveFilter::Active,
            Some(false) => ActiveFilter::Inactive,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub mobile_number: String,
    pub pin_hash: String,
    pub name: String,
    pub national_id: String,
    pub address: Option<Json<Address>>,
    pub expiry_date: OffsetDateTime,
    pub is_active: bool,
    pub total_bottles: i32,
    pub remaining_bottles: i32,
    pub weight: Option<f64>,
    pub date_of_birth: Option<Date>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            mobile_number: r.mobile_number,
            pin_hash: r.pin_hash,
            name: r.name,
            national_id: r.national_id,
            address: r.address.map(|Json(a)| a),
            expiry_date: r.expiry_date,
            is_active: r.is_active,
            total_bottles: r.total_bottles,
            remaining_bottles: r.remaining_bottles,
            weight: r.weight,
            date_of_birth: r.date_of_birth,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
