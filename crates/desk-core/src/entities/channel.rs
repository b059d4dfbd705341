//! Channel entity - a guild text, voice, or category channel

use serde::{Deserialize, Serialize};

use super::overwrite::{self, OverwriteKind, PermissionOverwrite};
use crate::value_objects::Snowflake;

/// Channel type as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "u8", into = "u8")]
pub enum ChannelType {
    /// Guild text channel
    #[default]
    GuildText,
    /// Direct message between users
    Dm,
    /// Guild voice channel
    GuildVoice,
    /// Group direct message
    GroupDm,
    /// Guild category for organizing channels
    GuildCategory,
    /// Any type this crate does not act on
    Other(u8),
}

impl From<u8> for ChannelType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::GuildText,
            1 => Self::Dm,
            2 => Self::GuildVoice,
            3 => Self::GroupDm,
            4 => Self::GuildCategory,
            other => Self::Other(other),
        }
    }
}

impl From<ChannelType> for u8 {
    fn from(ct: ChannelType) -> Self {
        match ct {
            ChannelType::GuildText => 0,
            ChannelType::Dm => 1,
            ChannelType::GuildVoice => 2,
            ChannelType::GroupDm => 3,
            ChannelType::GuildCategory => 4,
            ChannelType::Other(value) => value,
        }
    }
}

/// Channel entity
///
/// Always a snapshot: the platform is the source of truth, and a channel is
/// re-fetched before every decision that depends on its overwrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: ChannelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Snowflake>,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

impl Channel {
    /// Create a new voice channel
    #[must_use]
    pub fn new_voice(id: Snowflake, guild_id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            kind: ChannelType::GuildVoice,
            guild_id: Some(guild_id),
            name: Some(name.into()),
            parent_id: None,
            position: 0,
            permission_overwrites: Vec::new(),
        }
    }

    /// Create a new category channel
    #[must_use]
    pub fn new_category(id: Snowflake, guild_id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            kind: ChannelType::GuildCategory,
            ..Self::new_voice(id, guild_id, name)
        }
    }

    /// Move channel under a category
    #[must_use]
    pub fn with_parent(mut self, parent_id: Snowflake) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Replace the overwrite set
    #[must_use]
    pub fn with_overwrites(mut self, overwrites: Vec<PermissionOverwrite>) -> Self {
        self.permission_overwrites = overwrites;
        self
    }

    /// Check if this is a category
    #[inline]
    #[must_use]
    pub fn is_category(&self) -> bool {
        matches!(self.kind, ChannelType::GuildCategory)
    }

    /// Check if this is a voice channel
    #[inline]
    #[must_use]
    pub fn is_voice(&self) -> bool {
        matches!(self.kind, ChannelType::GuildVoice)
    }

    /// Check if the channel sits directly under the given category
    #[inline]
    #[must_use]
    pub fn is_in_category(&self, category_id: Snowflake) -> bool {
        self.parent_id == Some(category_id)
    }

    /// Get display name
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Find the overwrite for a subject
    #[must_use]
    pub fn overwrite(&self, kind: OverwriteKind, id: Snowflake) -> Option<&PermissionOverwrite> {
        overwrite::find_overwrite(&self.permission_overwrites, kind, id)
    }

    /// Derive the owning member of this channel (see [`overwrite::channel_owner`])
    #[must_use]
    pub fn owner(&self, bot_id: Snowflake) -> Option<Snowflake> {
        overwrite::channel_owner(&self.permission_overwrites, bot_id)
    }
}
