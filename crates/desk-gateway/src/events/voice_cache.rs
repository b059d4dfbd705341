//! Voice state cache - remembers which voice channel each user is in
//!
//! Voice-state dispatches only carry the channel a user moved to. The cache
//! supplies the channel they came from.

use dashmap::DashMap;
use desk_core::{Snowflake, VoiceState};

/// Last known voice channel per (guild, user)
#[derive(Debug, Default)]
pub struct VoiceStateCache {
    channels: DashMap<(Snowflake, Snowflake), Snowflake>,
}

impl VoiceStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything known about a guild with a guild-create snapshot
    pub fn seed(&self, guild_id: Snowflake, states: &[VoiceState]) {
        self.forget_guild(guild_id);
        for state in states {
            if let Some(channel_id) = state.channel_id {
                self.channels.insert((guild_id, state.user_id), channel_id);
            }
        }
    }

    /// Record a user's new channel and return the previous one
    pub fn update(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        channel_id: Option<Snowflake>,
    ) -> Option<Snowflake> {
        match channel_id {
            Some(channel_id) => self.channels.insert((guild_id, user_id), channel_id),
            None => self.channels.remove(&(guild_id, user_id)).map(|(_, previous)| previous),
        }
    }

    /// Current channel of a user, if connected
    pub fn channel_of(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Snowflake> {
        self.channels.get(&(guild_id, user_id)).map(|entry| *entry)
    }

    pub fn forget_guild(&self, guild_id: Snowflake) {
        self.channels.retain(|(guild, _), _| *guild != guild_id);
    }

    pub fn clear(&self) {
        self.channels.clear();
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
