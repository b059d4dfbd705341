//! Platform client port - the outbound operations the desk engine issues
//!
//! The engine only ever talks to the chat platform through this trait. The
//! gateway crate provides the REST implementation; tests provide an
//! in-memory one.

use async_trait::async_trait;
use serde::Serialize;

use crate::entities::{Channel, ChannelType, Guild, Member, PermissionOverwrite};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, DomainError>;

/// Largest page the member listing endpoint accepts
pub const MAX_MEMBER_PAGE_SIZE: u16 = 1000;

/// Body of a channel creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateChannel {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChannelType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Snowflake>,
    pub position: i32,
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

impl CreateChannel {
    /// Voice channel at the top of `parent_id`
    pub fn voice(
        name: impl Into<String>,
        parent_id: Snowflake,
        permission_overwrites: Vec<PermissionOverwrite>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ChannelType::GuildVoice,
            parent_id: Some(parent_id),
            position: 0,
            permission_overwrites,
        }
    }
}

#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// List all channels in a guild
    async fn list_guild_channels(&self, guild_id: Snowflake) -> PlatformResult<Vec<Channel>>;

    /// Fetch a single channel
    async fn get_channel(&self, channel_id: Snowflake) -> PlatformResult<Channel>;

    /// Fetch a guild (without channels or voice states)
    async fn get_guild(&self, guild_id: Snowflake) -> PlatformResult<Guild>;

    /// Create a channel in a guild
    async fn create_channel(&self, guild_id: Snowflake, request: &CreateChannel) -> PlatformResult<Channel>;

    /// Replace a channel's overwrite set
    async fn edit_channel_overwrites(
        &self,
        channel_id: Snowflake,
        overwrites: &[PermissionOverwrite],
    ) -> PlatformResult<Channel>;

    /// Post a plain text message
    async fn send_message(&self, channel_id: Snowflake, content: &str) -> PlatformResult<()>;

    /// List guild members ordered by user id, starting after `after`
    ///
    /// `limit` is clamped to `1..=`[`MAX_MEMBER_PAGE_SIZE`].
    async fn list_guild_members(
        &self,
        guild_id: Snowflake,
        limit: u16,
        after: Option<Snowflake>,
    ) -> PlatformResult<Vec<Member>>;
}
