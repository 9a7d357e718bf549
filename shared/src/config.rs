use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "tracker.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Page serving the counter badge
    pub source_url: String,
    /// Seconds between two counter readings
    pub interval_seconds: u64,
    /// JSON-lines file holding every recorded sample
    pub samples_path: PathBuf,
    /// Root directory for exported charts
    pub plot_dir: PathBuf,
    pub listen_addr: String,
    /// Seconds between two chart exports of the dashboard
    pub export_interval_seconds: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            source_url: String::new(),
            interval_seconds: 240,
            samples_path: PathBuf::from("data/samples.jsonl"),
            plot_dir: PathBuf::from("plots"),
            listen_addr: "0.0.0.0:8000".to_owned(),
            export_interval_seconds: 900,
        }
    }
}

impl TrackerConfig {
    /// Reads the TOML config named by `TRACKER_CONFIG` (or `tracker.toml`), falling back to
    /// defaults when the file is absent. `COUNTER_SOURCE_URL` overrides `source_url`.
    pub fn load(manifest_dir: &Path) -> Result<Self> {
        #[cfg(debug_assertions)]
        let _ = dotenvy::from_path(manifest_dir.join(".env"));
        #[cfg(not(debug_assertions))]
        let _ = manifest_dir;

        let path = env::var("TRACKER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_owned());
        let mut config = match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content)
                .with_context(|| format!("Invalid tracker config in {path}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e).with_context(|| format!("Can't read {path}")),
        };

        if let Ok(url) = env::var("COUNTER_SOURCE_URL") {
            config.source_url = url;
        }
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Load tracker config using the calling crate's manifest directory.
#[macro_export]
macro_rules! load_tracker_config {
    () => {
        $crate::config::TrackerConfig::load(std::path::Path::new(env!("CARGO_MANIFEST_DIR")))
    };
}
