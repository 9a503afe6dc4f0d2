use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::{ExpiredLotPolicy, DEFAULT_HORIZON_DAYS};
use crate::scenarios::DEFAULT_MOCK_LOT_COUNT;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub allocation: AllocationSettings,
    #[serde(default)]
    pub scenarios: ScenarioSettings,
    #[serde(default)]
    pub run_store: RunStoreSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct AllocationSettings {
    /// Days before expiry at which a lot starts to become urgent
    #[serde(default = "default_horizon_days")]
    pub urgency_horizon_days: u32,
    #[serde(default)]
    pub expired_policy: ExpiredLotPolicy,
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            urgency_horizon_days: default_horizon_days(),
            expired_policy: ExpiredLotPolicy::default(),
        }
    }
}

fn default_horizon_days() -> u32 { DEFAULT_HORIZON_DAYS }

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioSettings {
    /// Fixed seed for generated scenarios; a fresh one per run when unset
    pub seed: Option<u64>,
    #[serde(default = "default_mock_lot_count")]
    pub mock_lot_count: usize,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            seed: None,
            mock_lot_count: default_mock_lot_count(),
        }
    }
}

fn default_mock_lot_count() -> usize { DEFAULT_MOCK_LOT_COUNT }

#[derive(Debug, Clone, Deserialize)]
pub struct RunStoreSettings {
    #[serde(default = "default_max_runs")]
    pub max_runs: u64,
    #[serde(default = "default_run_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for RunStoreSettings {
    fn default() -> Self {
        Self {
            max_runs: default_max_runs(),
            ttl_secs: default_run_ttl_secs(),
        }
    }
}

fn default_max_runs() -> u64 { 256 }
fn default_run_ttl_secs() -> u64 { 3600 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

fn env_source() -> Environment {
    // e.g., SURPLUS__SERVER__PORT -> server.port
    Environment::with_prefix("SURPLUS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SURPLUS__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_allocation() {
        let allocation = AllocationSettings::default();
        assert_eq!(allocation.urgency_horizon_days, 30);
        assert_eq!(allocation.expired_policy, ExpiredLotPolicy::Prioritize);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_empty_source_uses_defaults() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str("", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.scenarios.mock_lot_count, 15);
        assert_eq!(settings.run_store.max_runs, 256);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let toml = r#"
            [allocation]
            urgency_horizon_days = 14
            expired_policy = "exclude"

            [scenarios]
            seed = 42
        "#;

        let settings: Settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.allocation.urgency_horizon_days, 14);
        assert_eq!(settings.allocation.expired_policy, ExpiredLotPolicy::Exclude);
        assert_eq!(settings.scenarios.seed, Some(42));
        assert_eq!(settings.logging.level, "info");
    }
}
