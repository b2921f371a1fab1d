//! Optional `buildwatch.ron` next to the working directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use buildwatch_core::{GroupingMode, TreeBuilder};
use buildwatch_engine::{default_cache_dir, EngineConfig};
use serde::Deserialize;
use watch_logging::{watch_info, watch_warn};

pub(crate) const CONFIG_FILENAME: &str = "buildwatch.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub(crate) enum Grouping {
    #[default]
    Classified,
    ProjectName,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub base_url: Option<String>,
    pub debounce_ms: Option<u64>,
    pub save_timeout_secs: Option<u64>,
    pub cache_dir: Option<PathBuf>,
    pub grouping: Grouping,
    pub log_to_terminal: bool,
}

impl AppConfig {
    pub(crate) fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig {
            cache_dir: self.cache_dir.clone().unwrap_or_else(default_cache_dir),
            ..EngineConfig::default()
        };
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(ms) = self.debounce_ms {
            config.debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = self.save_timeout_secs {
            config.save_timeout = Duration::from_secs(secs);
        }
        config
    }

    pub(crate) fn tree_builder(&self) -> TreeBuilder {
        let grouping = match self.grouping {
            Grouping::Classified => GroupingMode::Classified,
            Grouping::ProjectName => GroupingMode::ProjectName,
        };
        TreeBuilder::default().with_grouping(grouping)
    }
}

/// Missing file means defaults. Unreadable or malformed files are logged and ignored.
pub(crate) fn load_config(path: &Path) -> AppConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return AppConfig::default(),
        Err(err) => {
            watch_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            watch_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            watch_warn!("Failed to parse config from {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load_config(&temp.path().join(CONFIG_FILENAME)), AppConfig::default());
    }

    #[test]
    fn overrides_reach_engine_and_builder() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(
                base_url: Some("http://ci.local:9000"),
                debounce_ms: Some(250),
                cache_dir: Some("/tmp/bw"),
                grouping: ProjectName,
            )"#,
        )
        .unwrap();

        let config = load_config(&path);
        let engine = config.engine_config();
        assert_eq!(engine.base_url, "http://ci.local:9000");
        assert_eq!(engine.debounce, Duration::from_millis(250));
        assert_eq!(engine.cache_dir, PathBuf::from("/tmp/bw"));
        assert_eq!(engine.save_timeout, EngineConfig::default().save_timeout);
        assert_eq!(config.tree_builder().grouping(), GroupingMode::ProjectName);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(base_url: 42").unwrap();
        assert_eq!(load_config(&path), AppConfig::default());
    }
}
