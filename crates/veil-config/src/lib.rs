//! File-backed settings for veil deployments
//!
//! One TOML file covers engine timeouts, batch bounds, acceleration
//! switches, and the consistency toggle. Every field has a default, so an
//! empty file and a missing file behave identically.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use veil_accel::AccelFlags;
use veil_engine::{BatchConfig, EngineConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineSettings,

    #[serde(default)]
    pub batch: BatchSettings,

    #[serde(default)]
    pub accel: AccelFlags,

    #[serde(default)]
    pub consistency: ConsistencySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "default_filter_timeout_ms")]
    pub filter_timeout_ms: u64,

    #[serde(default = "default_document_timeout_ms")]
    pub document_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSettings {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[serde(default = "default_true")]
    pub continue_on_error: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencySettings {
    /// Issue session-stable tokens instead of bare templates.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            batch: BatchSettings::default(),
            accel: AccelFlags::default(),
            consistency: ConsistencySettings::default(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            filter_timeout_ms: default_filter_timeout_ms(),
            document_timeout_ms: default_document_timeout_ms(),
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            continue_on_error: true,
        }
    }
}

impl Default for ConsistencySettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_filter_timeout_ms() -> u64 {
    5_000
}

fn default_document_timeout_ms() -> u64 {
    30_000
}

fn default_max_concurrency() -> usize {
    4
}

fn default_true() -> bool {
    true
}

impl Settings {
    /// Load settings from the default location, writing a default file on
    /// first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`, writing a default file when it is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            let settings = Settings::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&settings)?;
            std::fs::write(path, content)?;
            Ok(settings)
        }
    }

    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "veil", "veil") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.veil/config.toml")
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            filter_timeout: Duration::from_millis(self.engine.filter_timeout_ms),
            document_timeout: Duration::from_millis(self.engine.document_timeout_ms),
            flags: self.accel,
        }
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            max_concurrency: self.batch.max_concurrency,
            continue_on_error: self.batch.continue_on_error,
        }
    }

    pub fn accel_flags(&self) -> AccelFlags {
        self.accel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.engine.filter_timeout_ms, 5_000);
        assert_eq!(settings.batch.max_concurrency, 4);
        assert!(settings.batch.continue_on_error);
        assert!(settings.consistency.enabled);
        assert!(!settings.accel.force_reference_splice);
    }

    #[test]
    fn test_round_trip() {
        let settings = Settings::default();
        let toml_str = toml::to_string(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.engine.document_timeout_ms, settings.engine.document_timeout_ms);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: Settings = toml::from_str(
            r#"
            [engine]
            filter_timeout_ms = 250

            [accel]
            force_reference_splice = true
            "#,
        )
        .unwrap();
        assert_eq!(parsed.engine.filter_timeout_ms, 250);
        assert_eq!(parsed.engine.document_timeout_ms, 30_000);
        assert!(parsed.accel.force_reference_splice);
        assert!(!parsed.accel.force_reference_scan);
    }

    #[test]
    fn test_engine_config_conversion() {
        let settings = Settings::default();
        let config = settings.engine_config();
        assert_eq!(config.filter_timeout, Duration::from_secs(5));
        assert_eq!(config.document_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let first = Settings::load_from(&path).unwrap();
        assert!(path.exists());
        let second = Settings::load_from(&path).unwrap();
        assert_eq!(first.batch.max_concurrency, second.batch.max_concurrency);
    }
}
