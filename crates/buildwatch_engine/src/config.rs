use std::path::PathBuf;
use std::time::Duration;

use buildwatch_core::{SyncSettings, DEFAULT_DEBOUNCE};
use reqwest::Url;

use crate::{FailureKind, FetchError};

/// Key of the local fallback slot. Also the cache file stem.
pub const DEFAULT_CACHE_KEY: &str = "teamcity-monitor-builds";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub base_url: String,
    pub inventory_path: String,
    pub selection_read_path: String,
    pub selection_write_path: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Upper bound for one remote save, after which it counts as failed.
    pub save_timeout: Duration,
    pub debounce: Duration,
    pub max_inventory_bytes: u64,
    pub cache_dir: PathBuf,
    pub cache_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            inventory_path: "/api/builds/tree".to_string(),
            selection_read_path: "/api/config".to_string(),
            selection_write_path: "/api/builds/tree/selection".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            save_timeout: Duration::from_secs(10),
            debounce: DEFAULT_DEBOUNCE,
            max_inventory_bytes: 8 * 1024 * 1024,
            cache_dir: PathBuf::from(".buildwatch"),
            cache_key: DEFAULT_CACHE_KEY.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        let base = Url::parse(&self.base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        base.join(path)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            debounce: self.debounce,
        }
    }
}
