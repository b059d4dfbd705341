//! Visibility reconciler - shows a desk to the guild while it is occupied
//!
//! Visibility lives entirely in the desk's @everyone role overwrite. Both
//! transitions are idempotent: when the overwrite is already in the target
//! state no request is made, so callers may invoke them unconditionally.

use desk_core::entities::overwrite::merge_overwrite;
use desk_core::{Channel, OverwriteKind, PermissionOverwrite, Permissions, Snowflake};
use tracing::{debug, info, instrument};

use super::context::DeskContext;
use super::error::ServiceResult;

/// Whether the guild at large can see a desk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeskVisibility {
    Hidden,
    Visible,
}

impl DeskVisibility {
    /// Read a desk's visibility from its @everyone overwrite
    ///
    /// Visible only when that overwrite allows VIEW_CHANNEL and does not
    /// deny it.
    pub fn of(channel: &Channel, guild_id: Snowflake) -> Self {
        let visible = channel
            .overwrite(OverwriteKind::Role, guild_id)
            .is_some_and(|ow| ow.grants(Permissions::VIEW_CHANNEL));
        if visible {
            Self::Visible
        } else {
            Self::Hidden
        }
    }
}

fn everyone_revokes_view(channel: &Channel, guild_id: Snowflake) -> bool {
    channel
        .overwrite(OverwriteKind::Role, guild_id)
        .is_some_and(|ow| ow.revokes(Permissions::VIEW_CHANNEL))
}

/// Visibility service
pub struct VisibilityService<'a> {
    ctx: &'a DeskContext,
}

impl<'a> VisibilityService<'a> {
    /// Create a new VisibilityService
    pub fn new(ctx: &'a DeskContext) -> Self {
        Self { ctx }
    }

    /// Let @everyone see the desk; returns whether an edit was made
    #[instrument(skip(self, channel), fields(channel_id = %channel.id))]
    pub async fn show_desk(&self, guild_id: Snowflake, channel: &Channel) -> ServiceResult<bool> {
        if DeskVisibility::of(channel, guild_id) == DeskVisibility::Visible {
            debug!("Desk already visible");
            return Ok(false);
        }

        self.apply(
            channel,
            PermissionOverwrite::role(guild_id, Permissions::VIEW_CHANNEL, Permissions::empty()),
        )
        .await?;
        info!(guild_id = %guild_id, "Desk shown");
        Ok(true)
    }

    /// Hide the desk from @everyone; returns whether an edit was made
    #[instrument(skip(self, channel), fields(channel_id = %channel.id))]
    pub async fn hide_desk(&self, guild_id: Snowflake, channel: &Channel) -> ServiceResult<bool> {
        if everyone_revokes_view(channel, guild_id) {
            debug!("Desk already hidden");
            return Ok(false);
        }

        self.apply(
            channel,
            PermissionOverwrite::role(guild_id, Permissions::empty(), Permissions::VIEW_CHANNEL),
        )
        .await?;
        info!(guild_id = %guild_id, "Desk hidden");
        Ok(true)
    }

    async fn apply(&self, channel: &Channel, update: PermissionOverwrite) -> ServiceResult<Channel> {
        let overwrites = merge_overwrite(&channel.permission_overwrites, update);
        Ok(self
            .ctx
            .client()
            .edit_channel_overwrites(channel.id, &overwrites)
            .await?)
    }
}
