use serde::{Deserialize, Serialize};
use snoozr_core::{EngineSettings, SentinelSettings};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `SNOOZR__ENGINE__IDLE_TIMEOUT_SECS=30`
pub const ENV_PREFIX: &str = "SNOOZR";

/// Main configuration for the snoozr daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whitelist file, one protected name per line (default: whitelist.txt)
    pub whitelist_path: PathBuf,

    /// Freeze thresholds
    pub engine: EngineConfig,

    /// Sentinel proxy names
    pub sentinel: SentinelSettings,

    /// Polling cadence
    pub monitoring: MonitoringConfig,

    /// Logging configuration
    pub logging: LogConfig,

    /// Desktop notifications
    pub notifications: NotificationConfig,
}

/// Freeze thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Freeze apps idle for longer than this many seconds (default: 10)
    pub idle_timeout_secs: u64,

    /// Only freeze apps using more than this many MB of RAM (default: 50)
    pub min_memory_mb: u64,

    /// Number of applications tracked at once (default: 7)
    pub history_capacity: usize,
}

/// Polling cadence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Tick interval in milliseconds (default: 1000)
    pub poll_interval_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log directory path (default: ./logs/)
    pub log_dir: PathBuf,

    /// Daily-rotated log file name (default: snoozr.log)
    pub log_file: String,
}

/// Desktop notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Notify on freezes, sentinel thaws and blindness (default: true)
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            whitelist_path: PathBuf::from("whitelist.txt"),
            engine: EngineConfig::default(),
            sentinel: SentinelSettings::default(),
            monitoring: MonitoringConfig::default(),
            logging: LogConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let settings = EngineSettings::default();
        Self {
            idle_timeout_secs: settings.idle_timeout_secs,
            min_memory_mb: settings.min_memory_mb,
            history_capacity: settings.history_capacity,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./logs"),
            log_file: "snoozr.log".to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Load configuration from a TOML file layered over the defaults
    ///
    /// A missing file yields the defaults. Environment variables prefixed
    /// with `SNOOZR__` override both, using `__` between section and key.
    ///
    /// # Example
    /// ```no_run
    /// use snoozr_daemon::config::Config;
    ///
    /// let config = Config::load(std::path::Path::new("snoozr.toml")).unwrap();
    /// println!("Idle timeout: {}s", config.engine.idle_timeout_secs);
    /// ```
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let layered = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Config::default())?)
            .add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(layered.try_deserialize()?)
    }

    /// Save configuration to TOML file
    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.engine.idle_timeout_secs == 0 {
            return Err("Idle timeout must be > 0".to_string());
        }

        if self.engine.min_memory_mb == 0 {
            return Err("Minimum memory must be > 0".to_string());
        }

        if !(1..=64).contains(&self.engine.history_capacity) {
            return Err(format!(
                "History capacity must be 1-64, got: {}",
                self.engine.history_capacity
            ));
        }

        if self.monitoring.poll_interval_ms == 0 {
            return Err("Poll interval must be > 0".to_string());
        }

        if self.sentinel.blind_threshold == 0 {
            return Err("Blind threshold must be > 0".to_string());
        }

        Ok(())
    }

    /// Engine settings for this configuration
    pub fn engine_settings(&self, dry_run: bool) -> EngineSettings {
        EngineSettings {
            idle_timeout_secs: self.engine.idle_timeout_secs,
            min_memory_mb: self.engine.min_memory_mb,
            dry_run,
            history_capacity: self.engine.history_capacity,
        }
    }

    /// Get full path to the log file
    pub fn log_path(&self) -> PathBuf {
        self.logging.log_dir.join(&self.logging.log_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.engine.idle_timeout_secs, 10);
        assert_eq!(config.engine.min_memory_mb, 50);
        assert_eq!(config.engine.history_capacity, 7);
        assert_eq!(config.monitoring.poll_interval_ms, 1000);
        assert_eq!(config.whitelist_path, PathBuf::from("whitelist.txt"));
        assert!(config.notifications.enabled);
    }

    #[test]
    fn test_logging_config_default() {
        let logging = LogConfig::default();

        assert_eq!(logging.log_dir, PathBuf::from("./logs"));
        assert_eq!(logging.log_file, "snoozr.log");
    }

    #[test]
    fn test_config_validation_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.engine.idle_timeout_secs = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Idle timeout"));
    }

    #[test]
    fn test_config_validation_zero_memory() {
        let mut config = Config::default();
        config.engine.min_memory_mb = 0;

        let result = config.validate();
        assert!(result.unwrap_err().contains("Minimum memory"));
    }

    #[test]
    fn test_config_validation_capacity_range() {
        let mut config = Config::default();

        config.engine.history_capacity = 0;
        assert!(config.validate().unwrap_err().contains("History capacity"));

        config.engine.history_capacity = 65;
        assert!(config.validate().is_err());

        config.engine.history_capacity = 64;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_interval() {
        let mut config = Config::default();
        config.monitoring.poll_interval_ms = 0;

        assert!(config.validate().unwrap_err().contains("Poll interval"));
    }

    #[test]
    fn test_engine_settings() {
        let mut config = Config::default();
        config.engine.idle_timeout_secs = 30;

        let settings = config.engine_settings(true);
        assert_eq!(settings.idle_timeout_secs, 30);
        assert_eq!(settings.min_memory_mb, 50);
        assert!(settings.dry_run);
    }

    #[test]
    fn test_log_path() {
        let config = Config::default();
        assert_eq!(config.log_path(), PathBuf::from("./logs/snoozr.log"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();

        assert!(toml_str.contains("idle_timeout_secs"));
        assert!(toml_str.contains("[engine]"));
        assert!(toml_str.contains("[sentinel]"));
        assert!(toml_str.contains("blind_marker"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let toml_str = r#"
            [engine]
            idle_timeout_secs = 120
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();

        assert_eq!(config.engine.idle_timeout_secs, 120);
        assert_eq!(config.engine.min_memory_mb, 50);
        assert_eq!(config.sentinel, SentinelSettings::default());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("snoozr.toml");

        let mut config = Config::default();
        config.engine.idle_timeout_secs = 45;
        config.engine.min_memory_mb = 200;
        config.sentinel.shell_surfaces = vec!["gnome-shell".to_string()];
        config.save_to_file(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.engine.idle_timeout_secs, 45);
        assert_eq!(loaded.engine.min_memory_mb, 200);
        assert_eq!(loaded.sentinel.shell_surfaces, vec!["gnome-shell"]);
    }
}
