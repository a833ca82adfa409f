use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{AppConfig, StorageBackend};
use crate::render::{JsonRenderer, PageRenderer};
use crate::seed::seed_catalog;
use crate::storage::{memory::MemoryStore, pg::PgStore, NutritionStore};
use crate::users::services::provision_user;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn NutritionStore>,
    pub renderer: Arc<dyn PageRenderer>,
    /// The provisioned demo user every request acts on.
    pub user_id: Uuid,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::from_config(config).await
    }

    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn NutritionStore> = match config.storage {
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is not set")?;
                let pg = PgStore::connect(url, config.max_connections).await?;
                pg.migrate().await?;
                Arc::new(pg)
            }
            StorageBackend::Memory => {
                info!("using in-memory storage; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        if config.seed_on_start {
            if let Err(e) = seed_catalog(store.as_ref()).await {
                warn!(error = ?e, "seeding failed; continuing");
            }
        }

        let user = provision_user(store.as_ref(), &config.demo_username).await?;

        Ok(Self::from_parts(
            Arc::new(config),
            store,
            Arc::new(JsonRenderer),
            user.id,
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn NutritionStore>,
        renderer: Arc<dyn PageRenderer>,
        user_id: Uuid,
    ) -> Self {
        Self {
            config,
            store,
            renderer,
            user_id,
        }
    }

    /// Seeded in-memory state for tests.
    #[cfg(test)]
    pub async fn fake() -> Self {
        Self::from_config(AppConfig::memory())
            .await
            .expect("in-memory state")
    }
}
