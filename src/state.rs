use crate::config::AppConfig;
use crate::session::SessionController;
use crate::storage::{FsStorage, MemoryStorage, StorageClient};
use std::sync::Arc;
use tokio::sync::Mutex;

/// `DATA_DIR` value that selects in-memory storage.
pub const MEMORY_DATA_DIR: &str = ":memory:";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub controller: Arc<Mutex<SessionController>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let storage: Arc<dyn StorageClient> = if config.data_dir.as_os_str() == MEMORY_DATA_DIR {
            tracing::warn!("DATA_DIR is {}; accounts and marks are not persisted", MEMORY_DATA_DIR);
            Arc::new(MemoryStorage::new())
        } else {
            Arc::new(FsStorage::new(&config.data_dir).await?)
        };
        tracing::info!(data_dir = %config.data_dir.display(), "storage ready");
        Ok(Self::from_parts(config, storage))
    }

    pub fn from_parts(config: Arc<AppConfig>, storage: Arc<dyn StorageClient>) -> Self {
        let controller = Arc::new(Mutex::new(SessionController::new(storage)));
        Self { config, controller }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            data_dir: MEMORY_DATA_DIR.into(),
            host: "127.0.0.1".into(),
            port: 0,
        });
        let storage = Arc::new(MemoryStorage::new()) as Arc<dyn StorageClient>;
        Self::from_parts(config, storage)
    }
}
