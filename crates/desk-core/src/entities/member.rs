//! Member entity - a user's membership in a guild

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Platform user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub system: bool,
}

impl User {
    pub fn new(id: Snowflake, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            global_name: None,
            bot: false,
            system: false,
        }
    }

    /// Bots and platform system users never get a desk
    #[inline]
    pub fn is_human(&self) -> bool {
        !self.bot && !self.system
    }
}

/// Guild member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,
}

impl Member {
    pub fn new(user: User) -> Self {
        Self {
            user,
            nick: None,
            guild_id: None,
        }
    }

    #[inline]
    pub fn user_id(&self) -> Snowflake {
        self.user.id
    }

    /// Name shown in the guild: nickname, then global name, then username
    pub fn display_name(&self) -> &str {
        self.nick
            .as_deref()
            .or(self.user.global_name.as_deref())
            .unwrap_or(&self.user.username)
    }
}
