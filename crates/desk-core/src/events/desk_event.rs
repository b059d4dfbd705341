//! Desk events - the subset of the platform's event feed the engine acts on

use crate::entities::{Guild, Member, User};
use crate::value_objects::Snowflake;

/// Inbound event, already decoded from the platform's wire format
#[derive(Debug, Clone)]
pub enum DeskEvent {
    /// Session (re)started; all in-memory state must be rebuilt
    Ready { bot_user: User },

    /// Guild became available: initial connect or any reconnect
    GuildCreate(Box<Guild>),

    /// A new member joined a guild
    GuildMemberAdd { guild_id: Snowflake, member: Member },

    /// A user's voice channel changed
    ///
    /// `before` is the channel the user was in prior to this event, as
    /// tracked by the gateway; `after` is `None` on disconnect.
    VoiceStateUpdate {
        guild_id: Snowflake,
        user_id: Snowflake,
        before: Option<Snowflake>,
        after: Option<Snowflake>,
    },
}

impl DeskEvent {
    /// Platform event name, for logging
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ready { .. } => "READY",
            Self::GuildCreate(_) => "GUILD_CREATE",
            Self::GuildMemberAdd { .. } => "GUILD_MEMBER_ADD",
            Self::VoiceStateUpdate { .. } => "VOICE_STATE_UPDATE",
        }
    }

    /// Guild the event belongs to, if any
    pub fn guild_id(&self) -> Option<Snowflake> {
        match self {
            Self::Ready { .. } => None,
            Self::GuildCreate(guild) => Some(guild.id),
            Self::GuildMemberAdd { guild_id, .. } | Self::VoiceStateUpdate { guild_id, .. } => {
                Some(*guild_id)
            }
        }
    }
}
