use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::repo_types::{ActiveFilter, NewUser, UserRecord, UserRow};
use crate::{db::PgStore, error::StoreError};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_mobile(&self, mobile_number: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_national_id(&self, national_id: &str)
        -> Result<Option<UserRecord>, StoreError>;

    /// Fails with `StoreError::Duplicate` if the mobile number or national ID is taken.
    async fn create(&self, draft: NewUser) -> Result<UserRecord, StoreError>;

    /// Fails with `StoreError::NotFound` and changes nothing if no user matches.
    async fn update_active_flag(
        &self,
        mobile_number: &str,
        is_active: bool,
    ) -> Result<UserRecord, StoreError>;

    async fn count(&self, filter: ActiveFilter) -> Result<u64, StoreError>;

    /// Newest first.
    async fn list_all(&self, filter: ActiveFilter) -> Result<Vec<UserRecord>, StoreError>;
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_mobile(&self, mobile_number: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, mobile_number, pin_hash, name, national_id, address, expiry_date,
                   is_active, total_bottles, remaining_bottles, weight, date_of_birth,
                   created_at, updated_at
            FROM users
            WHERE mobile_number = $1
            "#,
        )
        .bind(mobile_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserRecord::from))
    }

    async fn find_by_national_id(
        &self,
        national_id: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, mobile_number, pin_hash, name, national_id, address, expiry_date,
                   is_active, total_bottles, remaining_bottles, weight, date_of_birth,
                   created_at, updated_at
            FROM users
            WHERE national_id = $1
            "#,
        )
        .bind(national_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserRecord::from))
    }

    async fn create(&self, draft: NewUser) -> Result<UserRecord, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, mobile_number, pin_hash, name, national_id, address,
                               expiry_date, is_active, total_bottles, remaining_bottles,
                               weight, date_of_birth, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING id, mobile_number, pin_hash, name, national_id, address, expiry_date,
                      is_active, total_bottles, remaining_bottles, weight, date_of_birth,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&draft.mobile_number)
        .bind(draft.pin_hash.as_str())
        .bind(&draft.name)
        .bind(&draft.national_id)
        .bind(draft.address.map(Json))
        .bind(draft.expiry_date)
        .bind(draft.is_active)
        .bind(draft.total_bottles)
        .bind(draft.remaining_bottles)
        .bind(draft.weight)
        .bind(draft.date_of_birth)
        .bind(draft.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update_active_flag(
        &self,
        mobile_number: &str,
        is_active: bool,
    ) -> Result<UserRecord, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
               SET is_active = $2, updated_at = now()
             WHERE mobile_number = $1
            RETURNING id, mobile_number, pin_hash, name, national_id, address, expiry_date,
                      is_active, total_bottles, remaining_bottles, weight, date_of_birth,
                      created_at, updated_at
            "#,
        )
        .bind(mobile_number)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;
        row.map(UserRecord::from).ok_or(StoreError::NotFound)
    }

    async fn count(&self, filter: ActiveFilter) -> Result<u64, StoreError> {
        let n: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM users WHERE ($1::boolean IS NULL OR is_active = $1)"#,
        )
        .bind(filter.as_flag())
        .fetch_one(&self.pool)
        .await?;
        Ok(n.max(0) as u64)
    }

    async fn list_all(&self, filter: ActiveFilter) -> Result<Vec<UserRecord>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, mobile_number, pin_hash, name, national_id, address, expiry_date,
                   is_active, total_bottles, remaining_bottles, weight, date_of_birth,
                   created_at, updated_at
            FROM users
            WHERE ($1::boolean IS NULL OR is_active = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.as_flag())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(UserRecord::from).collect())
    }
}
