//! Gateway payload definitions
//!
//! Payloads exchanged with the gateway outside of event dispatches.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

bitflags! {
    /// Gateway intents: which event groups the session subscribes to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Intents: u64 {
        const GUILDS = 1 << 0;
        /// Privileged; must be enabled for the application
        const GUILD_MEMBERS = 1 << 1;
        const GUILD_VOICE_STATES = 1 << 7;
    }
}

impl Intents {
    /// Everything the desk engine listens to
    pub const DESKS: Self = Self::GUILDS
        .union(Self::GUILD_MEMBERS)
        .union(Self::GUILD_VOICE_STATES);
}

impl Serialize for Intents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for Intents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Self::from_bits_retain)
    }
}

/// Payload for op 2 (Identify)
///
/// Sent by the client to authenticate the session.
#[derive(Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Bot token, without the `Bot ` prefix
    pub token: String,

    /// Event groups to subscribe to
    pub intents: Intents,

    /// Client connection properties
    pub properties: IdentifyProperties,
}

impl IdentifyPayload {
    /// Identify with the desk engine's intents
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            intents: Intents::DESKS,
            properties: IdentifyProperties::default(),
        }
    }
}

impl std::fmt::Debug for IdentifyPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifyPayload")
            .field("token", &"[REDACTED]")
            .field("intents", &self.intents)
            .field("properties", &self.properties)
            .finish()
    }
}

/// Client connection properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyProperties {
    /// Operating system
    pub os: String,

    /// Library name
    pub browser: String,

    /// Library name
    pub device: String,
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: env!("CARGO_PKG_NAME").to_string(),
            device: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

/// Payload of the READY dispatch
///
/// Only the bot's own user is of interest; the guild list arrives as
/// separate GUILD_CREATE dispatches.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyPayload {
    pub user: desk_core::User,
    #[serde(default)]
    pub session_id: String,
}
