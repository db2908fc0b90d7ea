use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::password::SecretHash;

/// Admin record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct AdminRecord {
    pub id: Uuid,
    pub email: String,         // trimmed, lowercased
    pub password_hash: String, // Argon2 hash, never serialized
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub email: String,
    pub password_hash: SecretHash,
}
