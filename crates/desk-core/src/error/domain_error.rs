//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Desk category missing in guild {guild_id}")]
    DeskCategoryMissing { guild_id: Snowflake },

    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Guild not registered: {0}")]
    GuildNotRegistered(Snowflake),

    #[error("Guild not found: {0}")]
    GuildNotFound(Snowflake),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    // =========================================================================
    // Remote Call Errors
    // =========================================================================
    #[error("Remote call {operation} failed{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Remote {
        operation: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("Failed to create desk for user {user_id}: {reason}")]
    DeskCreation { user_id: Snowflake, reason: String },
}

impl DomainError {
    /// Create a remote call error
    pub fn remote(operation: &'static str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            operation,
            status,
            message: message.into(),
        }
    }

    /// Get an error code string for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::DeskCategoryMissing { .. } => "DESK_CATEGORY_MISSING",
            Self::GuildNotRegistered(_) => "GUILD_NOT_REGISTERED",
            Self::GuildNotFound(_) => "UNKNOWN_GUILD",
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::Remote { .. } => "REMOTE_CALL_FAILED",
            Self::DeskCreation { .. } => "DESK_CREATION_FAILED",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::GuildNotRegistered(_) | Self::GuildNotFound(_) | Self::ChannelNotFound(_)
        )
    }

    /// Check if this is a remote call failure (including a rejected creation)
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::DeskCreation { .. })
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::DeskCategoryMissing { .. })
    }
}
