//! Guild entity - the platform's server-level container

use serde::{Deserialize, Serialize};

use super::{Channel, VoiceState};
use crate::value_objects::Snowflake;

/// Guild (server) entity
///
/// `channels` and `voice_states` are only populated on guild-create
/// snapshots; a guild fetched over REST leaves them empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_channel_id: Option<Snowflake>,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub voice_states: Vec<VoiceState>,
}

impl Guild {
    /// Create a new Guild
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            system_channel_id: None,
            unavailable: false,
            channels: Vec::new(),
            voice_states: Vec::new(),
        }
    }

    /// The @everyone role shares its id with the guild
    #[inline]
    pub fn everyone_role_id(&self) -> Snowflake {
        self.id
    }

    /// Find a category channel by name, ignoring case
    pub fn find_category(&self, name: &str) -> Option<&Channel> {
        let wanted = name.to_lowercase();
        self.channels
            .iter()
            .find(|c| c.is_category() && c.display_name().to_lowercase() == wanted)
    }
}
