//! Analysis configuration.
//!
//! Loaded from TOML; every field is optional.
//!
//! ```toml
//! confidence_level = 0.95
//! worker_timeout_secs = 60
//! close_on_success = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

/// Options shared by every analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Confidence level for intervals, also printed as `CRITERIA` in the
    /// command log.
    pub confidence_level: f64,
    /// Deadline for the whole collection phase. `None` waits indefinitely.
    pub worker_timeout_secs: Option<u64>,
    /// Invoke the close callback after a clean run.
    pub close_on_success: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            worker_timeout_secs: None,
            close_on_success: true,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded analysis config");
        Ok(config)
    }

    #[must_use]
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    #[must_use]
    pub fn with_worker_timeout(mut self, seconds: Option<u64>) -> Self {
        self.worker_timeout_secs = seconds;
        self
    }

    #[must_use]
    pub fn with_close_on_success(mut self, close: bool) -> Self {
        self.close_on_success = close;
        self
    }

    pub fn worker_timeout(&self) -> Option<Duration> {
        self.worker_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "confidence_level must be between 0 and 1, got {}",
                    self.confidence_level
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.worker_timeout(), None);
    }

    #[test]
    fn parses_all_fields() {
        let config = AnalysisConfig::from_toml_str(
            "confidence_level = 0.9\nworker_timeout_secs = 60\nclose_on_success = false\n",
        )
        .unwrap();
        assert_eq!(config.confidence_level, 0.9);
        assert_eq!(config.worker_timeout(), Some(Duration::from_secs(60)));
        assert!(!config.close_on_success);
    }

    #[test]
    fn rejects_out_of_range_level() {
        let err = AnalysisConfig::from_toml_str("confidence_level = 95.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = AnalysisConfig::from_toml_str("confidence = 0.9").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ttest.toml");
        std::fs::write(&path, "worker_timeout_secs = 5\n").unwrap();
        let config = AnalysisConfig::load(&path).unwrap();
        assert_eq!(config.worker_timeout_secs, Some(5));

        let missing = AnalysisConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}
