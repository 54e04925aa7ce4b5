//! Runtime configuration.
//!
//! Settings are layered: built-in defaults, then an optional config file,
//! then `TESMAP_*` environment variables. Command-line flags override the
//! result in `main`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::Thresholds;

/// Poll cadence in milliseconds for the two refresh modes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub normal_ms: u64,
    pub fast_ms: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            normal_ms: 5000,
            fast_ms: 2000,
        }
    }
}

impl PollSettings {
    pub fn normal(&self) -> Duration {
        Duration::from_millis(self.normal_ms)
    }

    /// Cadence used while the real-time toggle is on.
    pub fn fast(&self) -> Duration {
        Duration::from_millis(self.fast_ms)
    }
}

/// Top-level settings for the dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of a live dashboard service.
    pub endpoint: Option<String>,
    /// Path of a topology JSON file to poll instead.
    pub file: Option<PathBuf>,
    /// Seed for the demo fixture generator.
    pub demo_seed: Option<u64>,
    pub poll: PollSettings,
    pub thresholds: Thresholds,
}

impl Settings {
    /// Load settings from an optional config file plus the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("TESMAP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::load(None).unwrap();
        assert!(settings.endpoint.is_none());
        assert!(settings.file.is_none());
        assert_eq!(settings.poll.normal(), Duration::from_millis(5000));
        assert_eq!(settings.poll.fast(), Duration::from_millis(2000));
        assert_eq!(settings.thresholds.usage_warning, 80.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "endpoint = \"http://localhost:8080\"\n\n[poll]\nfast_ms = 1000"
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.endpoint.as_deref(), Some("http://localhost:8080"));
        assert_eq!(settings.poll.fast(), Duration::from_millis(1000));
        // Unset keys keep their defaults
        assert_eq!(settings.poll.normal(), Duration::from_millis(5000));
    }

    #[test]
    fn test_thresholds_from_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[thresholds]\nusage_warning = 70.0").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.thresholds.usage_warning, 70.0);
        assert_eq!(settings.thresholds.usage_critical, 95.0);
    }
}
