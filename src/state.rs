use std::sync::Arc;

use tokio::sync::Mutex;

use crate::analysis::client::NutritionAnalyzer;
use crate::clock::SystemClock;
use crate::config::AppConfig;
use crate::journal::store::LogStore;
use crate::storage::{FileRecordStore, RecordStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Single writer: every journal operation runs while holding this lock.
    pub store: Arc<Mutex<LogStore>>,
    pub analyzer: Option<Arc<dyn NutritionAnalyzer>>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let storage = Arc::new(FileRecordStore::new(config.storage_path())) as Arc<dyn RecordStore>;
        tracing::info!(path = %config.storage_path().display(), "opening journal");
        let store = LogStore::open(storage, Arc::new(SystemClock))?;

        // No analysis backend ships with the service; the routes answer 503.
        Ok(Self::from_parts(config, store, None))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: LogStore,
        analyzer: Option<Arc<dyn NutritionAnalyzer>>,
    ) -> Self {
        Self {
            config,
            store: Arc::new(Mutex::new(store)),
            analyzer,
        }
    }

    pub fn analyzer(&self) -> Option<&dyn NutritionAnalyzer> {
        self.analyzer.as_deref()
    }

    /// In-memory storage, a clock pinned to 2024-03-10 and no analyzer.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with(None)
    }

    #[cfg(test)]
    pub fn fake_with(analyzer: Option<Arc<dyn NutritionAnalyzer>>) -> Self {
        use crate::clock::{Clock, FixedClock};
        use crate::storage::MemoryRecordStore;

        let config = Arc::new(AppConfig {
            data_dir: "./data".into(),
            host: "127.0.0.1".into(),
            port: 0,
        });
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(time::macros::date!(2024 - 03 - 10)));
        let store = LogStore::open(Arc::new(MemoryRecordStore::new()), clock)
            .expect("memory store opens");
        Self::from_parts(config, store, analyzer)
    }
}
