//! Configuration for the collector service
//!
//! Loaded from a TOML file. Every section has defaults, so a partial file or
//! no file at all is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level service configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub logging: LoggingConfig,
    pub stats: StatsConfig,
}

/// UDP ports
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address both sockets bind to
    pub bind_address: String,
    /// Port receiving sensor readings (never answers)
    pub sensor_port: u16,
    /// Port receiving queries and sending responses
    pub query_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            sensor_port: 12345,
            query_port: 12346,
        }
    }
}

/// Diagnostics and the raw reading log
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log filter (trace, debug, info, warn, error); `RUST_LOG` wins
    pub level: String,
    /// Append accepted readings to `csv_path`
    pub csv_enabled: bool,
    pub csv_path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            csv_enabled: true,
            csv_path: PathBuf::from("sensors.csv"),
        }
    }
}

/// Periodic statistics snapshot
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StatsConfig {
    pub interval_secs: u64,
}

impl StatsConfig {
    /// Snapshot period, at least one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self { interval_secs: 1 }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.network.bind_address, "0.0.0.0");
        assert_eq!(config.network.sensor_port, 12345);
        assert_eq!(config.network.query_port, 12346);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.csv_enabled);
        assert_eq!(config.logging.csv_path, PathBuf::from("sensors.csv"));
        assert_eq!(config.stats.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[network]
bind_address = "127.0.0.1"
sensor_port = 20000
query_port = 20001

[logging]
level = "debug"
csv_path = "/var/log/sensors.csv"

[stats]
interval_secs = 5
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.network.bind_address, "127.0.0.1");
        assert_eq!(config.network.sensor_port, 20000);
        assert_eq!(config.network.query_port, 20001);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.csv_enabled);
        assert_eq!(config.logging.csv_path, PathBuf::from("/var/log/sensors.csv"));
        assert_eq!(config.stats.interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("[network]\nquery_port = 9000\n").unwrap();
        assert_eq!(config.network.query_port, 9000);
        assert_eq!(config.network.sensor_port, 12345);
        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(config.stats, StatsConfig::default());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let stats = StatsConfig { interval_secs: 0 };
        assert_eq!(stats.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_toml_serialization_roundtrip() {
        let config = AppConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();
        assert!(toml_string.contains("[network]"));
        assert!(toml_string.contains("[logging]"));
        assert!(toml_string.contains("[stats]"));
        assert!(toml_string.contains("sensor_port = 12345"));

        let parsed: AppConfig = toml::from_str(&toml_string).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../sensor-server.toml");
        let config = AppConfig::from_file(path).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = AppConfig::from_file("/nonexistent/sensor-server.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
