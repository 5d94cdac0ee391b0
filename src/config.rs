//! Configuration management for the casino engine
//!
//! TOML file + `ROCKET_*` environment overrides + validation, with defaults
//! matching the live bot's tuning.

use crate::errors::{CasinoResult, ConfigurationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CasinoConfig {
    pub storage: StorageConfig,
    pub economy: EconomyConfig,
    pub blackjack: BlackjackConfig,
    pub status: StatusConfig,
}

/// Ledger file location
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub ledger_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            ledger_path: "data.json".to_string(),
        }
    }
}

/// Balances, cooldowns and XP awards
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub starting_cash: i64,
    /// Command name -> cooldown in seconds
    pub cooldowns: BTreeMap<String, f64>,
    pub xp: XpAwards,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        let cooldowns = [
            ("work", 600.0),
            ("daily", 86_400.0),
            ("dig", 60.0),
            ("coinflip", 5.0),
            ("blackjack", 10.0),
        ]
        .into_iter()
        .map(|(name, secs)| (name.to_string(), secs))
        .collect();

        Self {
            starting_cash: 1000,
            cooldowns,
            xp: XpAwards::default(),
        }
    }
}

/// XP granted per command
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct XpAwards {
    pub coinflip: u64,
    pub slots: u64,
    pub blackjack: u64,
    pub work: u64,
    pub daily: u64,
}

impl Default for XpAwards {
    fn default() -> Self {
        Self {
            coinflip: 1,
            slots: 3,
            blackjack: 5,
            work: 5,
            daily: 20,
        }
    }
}

/// Blackjack session tuning
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackjackConfig {
    pub action_timeout_secs: f64,
}

impl Default for BlackjackConfig {
    fn default() -> Self {
        Self {
            action_timeout_secs: 60.0,
        }
    }
}

/// Longest accepted wait for a single blackjack action
pub const MAX_ACTION_TIMEOUT_SECS: f64 = 86_400.0;

impl BlackjackConfig {
    /// Per-action wait. Values `Duration` cannot hold are clamped.
    pub fn action_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.action_timeout_secs.min(MAX_ACTION_TIMEOUT_SECS))
            .unwrap_or(Duration::ZERO)
    }
}

/// Status API listener
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> CasinoResult<CasinoConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            CasinoConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        self.validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> CasinoResult<CasinoConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    fn apply_env_overrides(&self, config: &mut CasinoConfig) -> CasinoResult<()> {
        if let Ok(path) = env::var("ROCKET_LEDGER_PATH") {
            config.storage.ledger_path = path;
        }
        if let Ok(port) = env::var("ROCKET_STATUS_PORT") {
            config.status.port = port.parse().map_err(|_| ConfigurationError::InvalidValue {
                field: "ROCKET_STATUS_PORT".to_string(),
                value: port,
                reason: "Invalid port number".to_string(),
            })?;
        }
        if let Ok(enabled) = env::var("ROCKET_STATUS_ENABLED") {
            config.status.enabled = enabled.parse().map_err(|_| ConfigurationError::InvalidValue {
                field: "ROCKET_STATUS_ENABLED".to_string(),
                value: enabled,
                reason: "Invalid boolean value".to_string(),
            })?;
        }
        if let Ok(timeout) = env::var("ROCKET_BLACKJACK_TIMEOUT") {
            config.blackjack.action_timeout_secs =
                timeout.parse().map_err(|_| ConfigurationError::InvalidValue {
                    field: "ROCKET_BLACKJACK_TIMEOUT".to_string(),
                    value: timeout,
                    reason: "Invalid timeout value".to_string(),
                })?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self, config: &CasinoConfig) -> CasinoResult<()> {
        if config.storage.ledger_path.is_empty() {
            return Err(ConfigurationError::MissingRequired("storage.ledger_path".to_string()).into());
        }

        if config.economy.starting_cash < 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "economy.starting_cash".to_string(),
                value: config.economy.starting_cash.to_string(),
                reason: "Starting cash cannot be negative".to_string(),
            }
            .into());
        }

        if let Some((name, secs)) = config
            .economy
            .cooldowns
            .iter()
            .find(|(_, secs)| !secs.is_finite() || **secs < 0.0)
        {
            return Err(ConfigurationError::InvalidValue {
                field: format!("economy.cooldowns.{}", name),
                value: secs.to_string(),
                reason: "Cooldown must be a non-negative number of seconds".to_string(),
            }
            .into());
        }

        let timeout = config.blackjack.action_timeout_secs;
        if !timeout.is_finite() || timeout <= 0.0 || timeout > MAX_ACTION_TIMEOUT_SECS {
            return Err(ConfigurationError::InvalidValue {
                field: "blackjack.action_timeout_secs".to_string(),
                value: timeout.to_string(),
                reason: format!("Timeout must be positive and at most {} seconds", MAX_ACTION_TIMEOUT_SECS),
            }
            .into());
        }

        if config.status.enabled && config.status.port == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "status.port".to_string(),
                value: "0".to_string(),
                reason: "Status port cannot be zero when the status API is enabled".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &CasinoConfig, path: &str) -> CasinoResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

/// Builder pattern for creating configurations
pub struct ConfigBuilder {
    config: CasinoConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CasinoConfig::default(),
        }
    }

    pub fn ledger_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.storage.ledger_path = path.as_ref().to_string_lossy().to_string();
        self
    }

    pub fn economy(mut self, economy: EconomyConfig) -> Self {
        self.config.economy = economy;
        self
    }

    pub fn cooldown(mut self, command: &str, secs: f64) -> Self {
        self.config.economy.cooldowns.insert(command.to_string(), secs);
        self
    }

    pub fn without_cooldowns(mut self) -> Self {
        self.config.economy.cooldowns.clear();
        self
    }

    pub fn starting_cash(mut self, cash: i64) -> Self {
        self.config.economy.starting_cash = cash;
        self
    }

    pub fn action_timeout(mut self, timeout: Duration) -> Self {
        self.config.blackjack.action_timeout_secs = timeout.as_secs_f64();
        self
    }

    pub fn status(mut self, status: StatusConfig) -> Self {
        self.config.status = status;
        self
    }

    pub fn build(self) -> CasinoConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config(path: &str) -> CasinoResult<()> {
    ConfigLoader::new().save(&CasinoConfig::default(), path)
}
