//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if one
//! is present). The bot token is not part of this: it comes from the CLI.

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub discord: DiscordConfig,
    pub desk: DeskSettings,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Platform endpoints and session behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
}

impl DiscordConfig {
    /// Pause between a dropped gateway session and the next identify
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            gateway_url: default_gateway_url(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
        }
    }
}

/// Desk behaviour settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeskSettings {
    /// Name of the category holding desk channels (matched case-insensitively)
    #[serde(default = "default_category_name")]
    pub category_name: String,
    /// Page size for the member listing during reconciliation (1..=1000)
    #[serde(default = "default_member_page_size")]
    pub member_page_size: u16,
    /// Post a notice in the system channel when a joining member gets a desk
    #[serde(default = "default_announce_new_desks")]
    pub announce_new_desks: bool,
}

impl Default for DeskSettings {
    fn default() -> Self {
        Self {
            category_name: default_category_name(),
            member_page_size: default_member_page_size(),
            announce_new_desks: default_announce_new_desks(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "deskbot".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_api_base_url() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=10&encoding=json".to_string()
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

fn default_category_name() -> String {
    "desks".to_string()
}

fn default_member_page_size() -> u16 {
    1000
}

fn default_announce_new_desks() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set to a value that cannot be used
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if a variable is set to a value that cannot be used
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match get("APP_ENV") {
            Some(raw) => Environment::parse(&raw).ok_or(ConfigError::InvalidValue("APP_ENV", raw))?,
            None => default_env(),
        };

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidValue("LOG_FORMAT", raw))?,
            None => LogFormat::default(),
        };

        let member_page_size = parse_or(&get, "DESK_MEMBER_PAGE_SIZE", default_member_page_size)?;
        if !(1..=1000).contains(&member_page_size) {
            return Err(ConfigError::InvalidValue(
                "DESK_MEMBER_PAGE_SIZE",
                member_page_size.to_string(),
            ));
        }

        let category_name = get("DESK_CATEGORY_NAME")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(default_category_name);
        if category_name.is_empty() {
            return Err(ConfigError::InvalidValue("DESK_CATEGORY_NAME", category_name));
        }

        Ok(Self {
            app: AppSettings {
                name: get("APP_NAME").unwrap_or_else(default_app_name),
                env,
                log_format,
            },
            discord: DiscordConfig {
                api_base_url: get("DISCORD_API_BASE_URL")
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or_else(default_api_base_url),
                gateway_url: get("DISCORD_GATEWAY_URL").unwrap_or_else(default_gateway_url),
                reconnect_delay_secs: parse_or(
                    &get,
                    "GATEWAY_RECONNECT_DELAY_SECS",
                    default_reconnect_delay_secs,
                )?,
            },
            desk: DeskSettings {
                category_name,
                member_page_size,
                announce_new_desks: parse_or(
                    &get,
                    "DESK_ANNOUNCE_NEW_DESKS",
                    default_announce_new_desks,
                )?,
            },
        })
    }
}

fn parse_or<F, T>(get: &F, key: &'static str, default: fn() -> T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
