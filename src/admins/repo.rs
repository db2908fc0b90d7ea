use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{AdminRecord, NewAdmin};
use crate::{db::PgStore, error::StoreError};

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>, StoreError>;

    /// Fails with `StoreError::Duplicate` on an email collision.
    async fn create(&self, draft: NewAdmin) -> Result<AdminRecord, StoreError>;
}

#[async_trait]
impl AdminStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>, StoreError> {
        let admin = sqlx::query_as::<_, AdminRecord>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM admins
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    async fn create(&self, draft: NewAdmin) -> Result<AdminRecord, StoreError> {
        let admin = sqlx::query_as::<_, AdminRecord>(
            r#"
            INSERT INTO admins (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&draft.email)
        .bind(draft.password_hash.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(admin)
    }
}
