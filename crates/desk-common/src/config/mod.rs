//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, DeskSettings, DiscordConfig, Environment, LogFormat,
};
