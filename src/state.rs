use std::sync::Arc;

use crate::admins::repo::AdminStore;
use crate::config::AppConfig;
use crate::db::{self, PgStore};
use crate::memory::MemoryStore;
use crate::users::repo::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub admins: Arc<dyn AdminStore>,
}

impl AppState {
    /// Connects to PostgreSQL and applies migrations; either failing is fatal.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config).await?;
        db::run_migrations(&pool).await?;

        let store = Arc::new(PgStore::new(pool));
        Ok(Self {
            config: Arc::new(config),
            users: store.clone() as Arc<dyn UserStore>,
            admins: store as Arc<dyn AdminStore>,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        admins: Arc<dyn AdminStore>,
    ) -> Self {
        Self {
            config,
            users,
            admins,
        }
    }

    /// State over fresh in-memory stores and the test config.
    pub fn fake() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(
            Arc::new(AppConfig::for_tests()),
            store.clone() as Arc<dyn UserStore>,
            store as Arc<dyn AdminStore>,
        )
    }
}
