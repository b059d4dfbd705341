//! Gateway event types
//!
//! Dispatch names (the `t` field) the engine subscribes to.

use std::fmt;
use std::str::FromStr;

/// Gateway event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayEventType {
    /// Sent after successful Identify
    Ready,
    /// Guild available, joined, or created
    GuildCreate,
    /// Left guild, kicked, or guild became unavailable
    GuildDelete,
    /// User joined guild
    GuildMemberAdd,
    /// User joined, moved between or left voice channels
    VoiceStateUpdate,
}

impl GatewayEventType {
    /// Get the string representation of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::GuildCreate => "GUILD_CREATE",
            Self::GuildDelete => "GUILD_DELETE",
            Self::GuildMemberAdd => "GUILD_MEMBER_ADD",
            Self::VoiceStateUpdate => "VOICE_STATE_UPDATE",
        }
    }
}

/// Dispatch name the engine does not handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnhandledEvent(pub String);

impl FromStr for GatewayEventType {
    type Err = UnhandledEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READY" => Ok(Self::Ready),
            "GUILD_CREATE" => Ok(Self::GuildCreate),
            "GUILD_DELETE" => Ok(Self::GuildDelete),
            "GUILD_MEMBER_ADD" => Ok(Self::GuildMemberAdd),
            "VOICE_STATE_UPDATE" => Ok(Self::VoiceStateUpdate),
            other => Err(UnhandledEvent(other.to_string())),
        }
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
