//! Node configuration loading and management.

use perk_core::RewardSchedule;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Full configuration for the Perk node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PerkConfig {
    /// API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Profile store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Settlement rail settings.
    #[serde(default)]
    pub settlement: SettlementConfig,

    /// Reward amounts, caps, and cooldowns.
    #[serde(default)]
    pub rewards: RewardSchedule,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Profile store backend: "rocks" (durable) or "memory" (ephemeral).
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Path to the data directory (rocks backend).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Which registered rail settles rewards: "rail-internal" or
    /// "rail-relayer".
    #[serde(default = "default_rail")]
    pub rail: String,
    /// Hard deadline on each transfer attempt, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Treasury balance for the internal rail, in reward units.
    #[serde(default = "default_treasury")]
    pub treasury: u64,
    /// Relayer endpoint (required when rail = "rail-relayer").
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bearer token for the relayer, if it requires one.
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// Token decimals used for base-unit conversion on the relayer rail.
    #[serde(default = "default_token_decimals")]
    pub token_decimals: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    3010
}
fn default_backend() -> String {
    "rocks".into()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_rail() -> String {
    "rail-internal".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_treasury() -> u64 {
    10_000_000
}
fn default_token_decimals() -> u32 {
    18
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            rail: default_rail(),
            timeout_secs: default_timeout_secs(),
            treasury: default_treasury(),
            endpoint: None,
            bearer_token: None,
            token_decimals: default_token_decimals(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl PerkConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: PerkConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// The socket address the API binds to.
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.listen_addr, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PerkConfig::default();
        assert_eq!(config.api.port, 3010);
        assert_eq!(config.storage.backend, "rocks");
        assert_eq!(config.settlement.rail, "rail-internal");
        assert_eq!(config.settlement.timeout_secs, 30);
        assert_eq!(config.rewards.welcome, 25);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_api_addr() {
        let config = PerkConfig::default();
        assert_eq!(config.api_addr(), "127.0.0.1:3010");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = PerkConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let decoded: PerkConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(decoded.api.port, config.api.port);
        assert_eq!(decoded.settlement.rail, config.settlement.rail);
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let config = PerkConfig::load(Path::new("/nonexistent/perk.toml")).unwrap();
        assert_eq!(config.api.port, 3010);
    }

    #[test]
    fn test_config_from_toml_partial() {
        let toml_str = r#"
[api]
port = 8080

[settlement]
rail = "rail-relayer"
endpoint = "http://relayer:9100/transfer"

[rewards]
daily_game_cap = 250
"#;
        let config: PerkConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.settlement.rail, "rail-relayer");
        assert_eq!(
            config.settlement.endpoint.as_deref(),
            Some("http://relayer:9100/transfer")
        );
        assert_eq!(config.rewards.daily_game_cap, 250);
        // Defaults for unspecified
        assert_eq!(config.rewards.welcome, 25);
        assert_eq!(config.storage.backend, "rocks");
    }
}
