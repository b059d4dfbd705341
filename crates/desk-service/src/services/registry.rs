//! Guild registry - which category holds the desks of each guild

use dashmap::DashMap;
use desk_core::{DomainError, Snowflake};

/// Concurrent guild → desk category map
///
/// Entries are written on every guild-create and cleared on READY. Callers
/// never lock; each operation touches a single shard.
#[derive(Debug, Default)]
pub struct GuildRegistry {
    categories: DashMap<Snowflake, Snowflake>,
}

impl GuildRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a guild to its desk category, replacing any earlier mapping
    pub fn register(&self, guild_id: Snowflake, category_id: Snowflake) {
        self.categories.insert(guild_id, category_id);
    }

    /// Desk category of a guild
    pub fn lookup(&self, guild_id: Snowflake) -> Result<Snowflake, DomainError> {
        self.categories
            .get(&guild_id)
            .map(|entry| *entry.value())
            .ok_or(DomainError::GuildNotRegistered(guild_id))
    }

    /// Forget a guild; returns the category it was mapped to
    pub fn unregister(&self, guild_id: Snowflake) -> Option<Snowflake> {
        self.categories.remove(&guild_id).map(|(_, category)| category)
    }

    pub fn clear(&self) {
        self.categories.clear();
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
