//! Client configuration.

use std::path::PathBuf;

use integrations::AddressFormat;
use rewards_store::{StreakPolicy, DEFAULT_KEY_PREFIX};
use serde::{Deserialize, Serialize};

/// Point amounts awarded by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardsConfig {
    /// Awarded once when the profile form is first submitted.
    #[serde(default = "default_registration_bonus")]
    pub registration_bonus: i64,
    /// Awarded for the first login of each calendar day.
    #[serde(default = "default_daily_login_bonus")]
    pub daily_login_bonus: i64,
    /// Awarded per assistant message.
    #[serde(default = "default_ai_chat_points")]
    pub ai_chat_points: i64,
}

fn default_registration_bonus() -> i64 {
    50
}

fn default_daily_login_bonus() -> i64 {
    10
}

fn default_ai_chat_points() -> i64 {
    5
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            registration_bonus: default_registration_bonus(),
            daily_login_bonus: default_daily_login_bonus(),
            ai_chat_points: default_ai_chat_points(),
        }
    }
}

/// Client configuration loaded from `carvfi.toml` and the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// File holding the persisted key-value storage.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Prefix for storage keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// How skipped days affect the login streak.
    #[serde(default)]
    pub streak_policy: StreakPolicy,

    /// Chain RPC endpoint for balance queries.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Wallet provider name shown to the user.
    #[serde(default = "default_wallet_name")]
    pub wallet_name: String,

    /// Address format accepted from the wallet provider.
    #[serde(default)]
    pub address_format: AddressFormat,

    /// Simulated assistant latency in milliseconds.
    #[serde(default = "default_assistant_delay_ms")]
    pub assistant_delay_ms: u64,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Point amounts.
    #[serde(default)]
    pub rewards: RewardsConfig,
}

fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("carvfi")
        .join("storage.json")
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

fn default_rpc_url() -> String {
    integrations::DEFAULT_RPC_URL.to_string()
}

fn default_wallet_name() -> String {
    "BackPack".to_string()
}

fn default_assistant_delay_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            key_prefix: default_key_prefix(),
            streak_policy: StreakPolicy::default(),
            rpc_url: default_rpc_url(),
            wallet_name: default_wallet_name(),
            address_format: AddressFormat::default(),
            assistant_delay_ms: default_assistant_delay_ms(),
            log_level: default_log_level(),
            rewards: RewardsConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `.env`, the environment and an optional
    /// config file. Environment variables take precedence over the file.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let file_contents = match Self::find_config_file() {
            Some(path) => Some(std::fs::read_to_string(path)?),
            None => None,
        };

        Self::from_sources(file_contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Builds a configuration from config file contents and an environment
    /// lookup.
    pub fn from_sources(
        file_contents: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match file_contents {
            Some(contents) => toml::from_str::<Config>(contents)?,
            None => Self::default(),
        };

        if let Some(path) = env("CARVFI_DATA_FILE") {
            config.data_file = PathBuf::from(path);
        }

        if let Some(prefix) = env("CARVFI_KEY_PREFIX") {
            config.key_prefix = prefix;
        }

        if let Some(policy) = env("CARVFI_STREAK_POLICY") {
            config.streak_policy = StreakPolicy::parse(&policy).ok_or(ConfigError::Invalid {
                key: "CARVFI_STREAK_POLICY",
                value: policy,
            })?;
        }

        if let Some(url) = env("CARVFI_RPC_URL") {
            config.rpc_url = url;
        }

        if let Some(name) = env("CARVFI_WALLET_NAME") {
            config.wallet_name = name;
        }

        if let Some(format) = env("CARVFI_ADDRESS_FORMAT") {
            config.address_format = AddressFormat::parse(&format).ok_or(ConfigError::Invalid {
                key: "CARVFI_ADDRESS_FORMAT",
                value: format,
            })?;
        }

        if let Some(delay) = env("CARVFI_ASSISTANT_DELAY_MS") {
            config.assistant_delay_ms = delay.parse().unwrap_or(default_assistant_delay_ms());
        }

        if let Some(level) = env("CARVFI_LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(bonus) = env("CARVFI_REGISTRATION_BONUS") {
            config.rewards.registration_bonus =
                bonus.parse().unwrap_or(default_registration_bonus());
        }

        if let Some(bonus) = env("CARVFI_DAILY_LOGIN_BONUS") {
            config.rewards.daily_login_bonus = bonus.parse().unwrap_or(default_daily_login_bonus());
        }

        if let Some(points) = env("CARVFI_AI_CHAT_POINTS") {
            config.rewards.ai_chat_points = points.parse().unwrap_or(default_ai_chat_points());
        }

        Ok(config)
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let locations = [
            PathBuf::from("carvfi.toml"),
            dirs::config_dir()
                .map(|p| p.join("carvfi").join("config.toml"))
                .unwrap_or_default(),
        ];

        locations.into_iter().find(|p| p.is_file())
    }

    /// Returns the store options implied by this configuration.
    pub fn store_config(&self) -> rewards_store::StoreConfig {
        rewards_store::StoreConfig::new()
            .with_key_prefix(&self.key_prefix)
            .with_streak_policy(self.streak_policy)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::from_sources(None, env_from(&[])).unwrap();
        assert_eq!(config.key_prefix, "carvfi");
        assert_eq!(config.streak_policy, StreakPolicy::Continuous);
        assert_eq!(config.rewards.registration_bonus, 50);
        assert_eq!(config.rewards.daily_login_bonus, 10);
        assert!(config.data_file.ends_with("carvfi/storage.json"));
    }

    #[test]
    fn test_file_config() {
        let contents = r#"
            key_prefix = "staging"
            streak_policy = "reset_on_gap"

            [rewards]
            daily_login_bonus = 20
        "#;
        let config = Config::from_sources(Some(contents), env_from(&[])).unwrap();

        assert_eq!(config.key_prefix, "staging");
        assert_eq!(config.streak_policy, StreakPolicy::ResetOnGap);
        assert_eq!(config.rewards.daily_login_bonus, 20);
        assert_eq!(config.rewards.registration_bonus, 50);
    }

    #[test]
    fn test_env_overrides_file() {
        let contents = r#"key_prefix = "staging""#;
        let config = Config::from_sources(
            Some(contents),
            env_from(&[
                ("CARVFI_KEY_PREFIX", "dev"),
                ("CARVFI_DATA_FILE", "/tmp/carvfi.json"),
                ("CARVFI_ASSISTANT_DELAY_MS", "0"),
            ]),
        )
        .unwrap();

        assert_eq!(config.key_prefix, "dev");
        assert_eq!(config.data_file, PathBuf::from("/tmp/carvfi.json"));
        assert_eq!(config.assistant_delay_ms, 0);
        assert_eq!(config.store_config().keys.users, "dev_users");
    }

    #[test]
    fn test_invalid_streak_policy() {
        let err = Config::from_sources(None, env_from(&[("CARVFI_STREAK_POLICY", "weekly")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_address_format() {
        let config = Config::from_sources(None, env_from(&[])).unwrap();
        assert_eq!(config.address_format, AddressFormat::Any);

        let config = Config::from_sources(Some(r#"address_format = "solana""#), env_from(&[]))
            .unwrap();
        assert_eq!(config.address_format, AddressFormat::Solana);

        let err = Config::from_sources(None, env_from(&[("CARVFI_ADDRESS_FORMAT", "evm")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "CARVFI_ADDRESS_FORMAT",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_toml() {
        let err = Config::from_sources(Some("key_prefix = "), env_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
