//! Configuration for the Emotion Monitor.

use crate::audit::LogFormat;
use crate::collector::SamplerKind;
use crate::core::baseline::DEFAULT_CALIBRATION_SAMPLES;
use crate::core::classifier::ClassificationPolicy;
use crate::core::history::DEFAULT_HISTORY_CAPACITY;
use crate::notify::CooldownPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Time between samples
    #[serde(with = "duration_serde")]
    pub sample_interval: Duration,

    /// Samples collected before the first baseline is computed
    pub calibration_samples: usize,

    /// Classified samples kept for the dashboard chart
    pub history_capacity: usize,

    /// Threshold ladder used by the classifier
    pub policy: ClassificationPolicy,

    /// Where samples come from
    pub source: SamplerKind,

    /// Cooldown band between break reminders
    pub cooldown: CooldownPolicy,

    /// Whether reminders are shown on the desktop (otherwise logged only)
    pub notifications: bool,

    /// Suppress all reminders
    pub focus_mode: bool,

    /// Local port for the stats endpoint
    pub port: u16,

    /// Seconds between status line refreshes
    pub status_refresh_secs: u64,

    /// Session log line format
    pub log_format: LogFormat,

    /// Path for the baseline, session log and stats
    pub data_path: PathBuf,

    /// Whether sampling is currently paused
    pub paused: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("emotion-monitor");

        Self {
            sample_interval: Duration::from_secs(15),
            calibration_samples: DEFAULT_CALIBRATION_SAMPLES,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            policy: ClassificationPolicy::default(),
            source: SamplerKind::default(),
            cooldown: CooldownPolicy::default(),
            notifications: true,
            focus_mode: false,
            port: 8080,
            status_refresh_secs: 5,
            log_format: LogFormat::default(),
            data_path: data_dir,
            paused: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file. A missing file yields defaults.
    pub fn load_from(config_path: &std::path::Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("emotion-monitor")
            .join("config.json")
    }

    /// Reject settings the monitor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval.is_zero() {
            return Err(ConfigError::Invalid("sample_interval must be positive".into()));
        }
        if self.calibration_samples == 0 {
            return Err(ConfigError::Invalid("calibration_samples must be at least 1".into()));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid("history_capacity must be at least 1".into()));
        }
        if self.cooldown.min_secs > self.cooldown.max_secs {
            return Err(ConfigError::Invalid(format!(
                "cooldown min ({}s) exceeds max ({}s)",
                self.cooldown.min_secs, self.cooldown.max_secs
            )));
        }
        Ok(())
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(self.logs_dir())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    pub fn baseline_path(&self) -> PathBuf {
        self.data_path.join("baseline.json")
    }

    pub fn stats_path(&self) -> PathBuf {
        self.data_path.join("session_stats.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_path.join("logs")
    }

    pub fn session_log_path(&self) -> PathBuf {
        self.logs_dir().join(self.log_format.file_name())
    }

    pub fn status_refresh(&self) -> Duration {
        Duration::from_secs(self.status_refresh_secs.max(1))
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sample_interval, Duration::from_secs(15));
        assert_eq!(config.calibration_samples, 12);
        assert_eq!(config.history_capacity, 40);
        assert_eq!(config.policy, ClassificationPolicy::Relative);
        assert_eq!(config.cooldown, CooldownPolicy { min_secs: 420, max_secs: 480 });
        assert!(!config.paused);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"sample_interval": 5, "policy": "absolute"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.sample_interval, Duration::from_secs(5));
        assert_eq!(config.policy, ClassificationPolicy::Absolute);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.paused = true;
        config.log_format = LogFormat::Csv;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.paused);
        assert_eq!(loaded.log_format, LogFormat::Csv);
        assert!(loaded.session_log_path().ends_with("logs/session_log.csv"));
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.cooldown = CooldownPolicy { min_secs: 900, max_secs: 420 };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.sample_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "paused = true").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::ParseError(_))));
    }
}
