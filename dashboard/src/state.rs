use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDateTime;
use click_engine::Sample;
use shared::config::TrackerConfig;
use shared::storage::{Recorded, SampleStore};
use tokio::sync::RwLock;
use tracing::warn;

pub struct AppState {
    store: Arc<SampleStore>,
    pub plot_dir: PathBuf,
    samples: RwLock<Vec<Sample>>,
}

impl AppState {
    pub fn new(config: &TrackerConfig) -> Self {
        let store = SampleStore::new(&config.samples_path);
        let samples = store.load().unwrap_or_else(|e| {
            warn!("Failed to load samples: {e:#}");
            Vec::new()
        });
        AppState {
            store: Arc::new(store),
            plot_dir: config.plot_dir.clone(),
            samples: RwLock::new(samples),
        }
    }

    /// Writes a reading to the store and refreshes the cache under the same write guard.
    pub async fn record(&self, time: NaiveDateTime, value: f64) -> Result<Recorded> {
        let mut cache = self.samples.write().await;
        let store = Arc::clone(&self.store);
        let (recorded, fresh) = tokio::task::spawn_blocking(move || {
            let recorded = store.record(time, value)?;
            anyhow::Ok((recorded, store.load()?))
        })
        .await??;
        *cache = fresh;
        Ok(recorded)
    }

    /// Re-reads the sample store; returns the number of samples now cached.
    pub async fn reload(&self) -> Result<usize> {
        let store = Arc::clone(&self.store);
        let fresh = tokio::task::spawn_blocking(move || store.load()).await??;
        let count = fresh.len();
        *self.samples.write().await = fresh;
        Ok(count)
    }

    /// Time-sorted copy of the cached samples.
    pub async fn samples(&self) -> Vec<Sample> {
        self.samples.read().await.clone()
    }
}
