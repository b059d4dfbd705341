//! Occupancy tracking - how many members sit in each desk
//!
//! Counts are seeded from the guild-create voice-state snapshot and then only
//! move by connect/disconnect deltas. They are never re-synced against the
//! platform, so a dropped event skews a count until the next guild-create.

use std::collections::HashMap;

use dashmap::DashMap;
use desk_core::{Snowflake, VoiceState};

/// Per-channel occupant counter keyed by `(guild, channel)`
///
/// Every mutation on one channel is serialized; counts never go below zero.
pub trait OccupancyStore: Send + Sync {
    /// Replace every count of a guild
    fn initialize(&self, guild_id: Snowflake, counts: HashMap<Snowflake, u32>);

    /// Add one occupant; returns the new count
    fn increment(&self, guild_id: Snowflake, channel_id: Snowflake) -> u32;

    /// Remove one occupant, flooring at zero; returns the new count
    fn decrement(&self, guild_id: Snowflake, channel_id: Snowflake) -> u32;

    /// Current count (zero when unknown)
    fn count(&self, guild_id: Snowflake, channel_id: Snowflake) -> u32;

    /// Drop every guild
    fn clear(&self);
}

/// Build initial counts from a voice-state snapshot
///
/// States without a channel (disconnected users) are ignored.
pub fn counts_from_voice_states(states: &[VoiceState]) -> HashMap<Snowflake, u32> {
    let mut counts = HashMap::new();
    for channel_id in states.iter().filter_map(|state| state.channel_id) {
        *counts.entry(channel_id).or_insert(0) += 1;
    }
    counts
}

/// [`OccupancyStore`] locking per guild
///
/// Each guild's channel map lives in its own `DashMap` entry, so events for
/// different guilds rarely contend. The entry guard is dropped before the
/// method returns and is never held across an `.await`.
#[derive(Debug, Default)]
pub struct OccupancyTracker {
    guilds: DashMap<Snowflake, HashMap<Snowflake, u32>>,
}

impl OccupancyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of guilds with a seeded map
    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }
}

impl OccupancyStore for OccupancyTracker {
    fn initialize(&self, guild_id: Snowflake, counts: HashMap<Snowflake, u32>) {
        self.guilds.insert(guild_id, counts);
    }

    fn increment(&self, guild_id: Snowflake, channel_id: Snowflake) -> u32 {
        let mut guild = self.guilds.entry(guild_id).or_default();
        let count = guild.entry(channel_id).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    fn decrement(&self, guild_id: Snowflake, channel_id: Snowflake) -> u32 {
        let mut guild = self.guilds.entry(guild_id).or_default();
        let count = guild.entry(channel_id).or_insert(0);
        *count = count.saturating_sub(1);
        *count
    }

    fn count(&self, guild_id: Snowflake, channel_id: Snowflake) -> u32 {
        self.guilds
            .get(&guild_id)
            .and_then(|guild| guild.get(&channel_id).copied())
            .unwrap_or(0)
    }

    fn clear(&self) {
        self.guilds.clear();
    }
}
