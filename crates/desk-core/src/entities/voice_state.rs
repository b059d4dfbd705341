//! Voice state - which voice channel a user is connected to

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Voice state as reported by the platform
///
/// `channel_id` is `None` once the user has disconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    pub user_id: Snowflake,
}

impl VoiceState {
    pub fn connected(user_id: Snowflake, channel_id: Snowflake) -> Self {
        Self {
            guild_id: None,
            channel_id: Some(channel_id),
            user_id,
        }
    }
}
