use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::ordering::SortKey;

pub const CONFIG_VERSION: u64 = 1;

const APP_DIR: &str = "my-tracker";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
}

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub version: u64,
    /// Base URL of the document gateway. Empty means offline.
    pub gateway_url: String,
    /// Base URL of the blob store. Empty falls back to `{gateway_url}/blobs`.
    pub blob_url: String,
    pub poll_interval_secs: u64,
    pub default_sort: SortKey,
    pub debug_logging: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            gateway_url: String::new(),
            blob_url: String::new(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            default_sort: SortKey::Default,
            debug_logging: false,
        }
    }
}

impl TrackerConfig {
    /// `~/.config/my-tracker/config.json` or the platform equivalent.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the config, falling back to defaults when it is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::default()
            }
            Err(e) => {
                log::warn!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_offline(&self) -> bool {
        self.gateway_url.trim().is_empty()
    }

    pub fn blob_base_url(&self) -> String {
        let blob = self.blob_url.trim();
        if blob.is_empty() {
            format!("{}/blobs", self.gateway_url.trim().trim_end_matches('/'))
        } else {
            blob.to_string()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrackerConfig::load_or_default(&dir.path().join("absent.json"));
        assert_eq!(config, TrackerConfig::default());
        assert!(config.is_offline());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = TrackerConfig {
            gateway_url: "https://docs.example.com/v1/".into(),
            default_sort: SortKey::PriorityHigh,
            ..TrackerConfig::default()
        };
        config.save_to(&path).unwrap();
        let loaded = TrackerConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.blob_base_url(), "https://docs.example.com/v1/blobs");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"default_sort": "name", "poll_interval_secs": 0}"#).unwrap();
        let config = TrackerConfig::load_or_default(&path);
        assert_eq!(config.default_sort, SortKey::Name);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.version, CONFIG_VERSION);
    }

    #[test]
    fn broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(TrackerConfig::load_from(&path), Err(ConfigError::Parse { .. })));
        assert_eq!(TrackerConfig::load_or_default(&path), TrackerConfig::default());
    }
}
