//! In-memory stores for tests and local runs without PostgreSQL.
//!
//! Each write holds the lock for the whole check-then-insert, so uniqueness
//! holds under concurrent callers the same way the database constraints do.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    admins::{
        repo::AdminStore,
        repo_types::{AdminRecord, NewAdmin},
    },
    error::{StoreError, UniqueField},
    users::{
        repo::UserStore,
        repo_types::{ActiveFilter, NewUser, UserRecord},
    },
};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<UserRecord>>,
    admins: RwLock<Vec<AdminRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_mobile(&self, mobile_number: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.mobile_number == mobile_number)
            .cloned())
    }

    async fn find_by_national_id(
        &self,
        national_id: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.national_id == national_id).cloned())
    }

    async fn create(&self, draft: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.mobile_number == draft.mobile_number) {
            return Err(StoreError::Duplicate(UniqueField::MobileNumber));
        }
        if users.iter().any(|u| u.national_id == draft.national_id) {
            return Err(StoreError::Duplicate(UniqueField::NationalId));
        }
        let record = draft.into_record(Uuid::new_v4());
        users.push(record.clone());
        Ok(record)
    }

    async fn update_active_flag(
        &self,
        mobile_number: &str,
        is_active: bool,
    ) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.mobile_number == mobile_number)
            .ok_or(StoreError::NotFound)?;
        user.is_active = is_active;
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn count(&self, filter: ActiveFilter) -> Result<u64, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| filter.matches(u.is_active)).count() as u64)
    }

    async fn list_all(&self, filter: ActiveFilter) -> Result<Vec<UserRecord>, StoreError> {
        let users = self.users.read().await;
        let mut out: Vec<UserRecord> = users
            .iter()
            .filter(|u| filter.matches(u.is_active))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>, StoreError> {
        let admins = self.admins.read().await;
        Ok(admins.iter().find(|a| a.email == email).cloned())
    }

    async fn create(&self, draft: NewAdmin) -> Result<AdminRecord, StoreError> {
        let mut admins = self.admins.write().await;
        if admins.iter().any(|a| a.email == draft.email) {
            return Err(StoreError::Duplicate(UniqueField::Email));
        }
        let record = AdminRecord {
            id: Uuid::new_v4(),
            email: draft.email,
            password_hash: draft.password_hash.into_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        admins.push(record.clone());
        Ok(record)
    }
}
