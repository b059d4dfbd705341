//! Desk provisioner - creates desks and keeps their owner/bot grants intact

use desk_core::entities::overwrite::merge_overwrite;
use desk_core::{
    Channel, CreateChannel, DomainError, OverwriteKind, PermissionOverwrite, Permissions, Snowflake,
};
use tracing::{debug, info, instrument};

use super::context::DeskContext;
use super::error::ServiceResult;

/// Overwrites of a freshly created desk
///
/// The owner may see and manage the desk, the bot may see it, and everyone
/// else (the @everyone role, whose id is the guild id) may not.
pub fn desk_overwrites(guild_id: Snowflake, user_id: Snowflake, bot_id: Snowflake) -> Vec<PermissionOverwrite> {
    vec![
        PermissionOverwrite::member(user_id, Permissions::DESK_OWNER, Permissions::empty()),
        PermissionOverwrite::member(bot_id, Permissions::DESK_BOT, Permissions::empty()),
        PermissionOverwrite::role(guild_id, Permissions::empty(), Permissions::VIEW_CHANNEL),
    ]
}

/// Whether the owner and bot grants are already in place
pub fn grants_hold(channel: &Channel, user_id: Snowflake, bot_id: Snowflake) -> bool {
    let granted = |id, required| {
        channel
            .overwrite(OverwriteKind::Member, id)
            .is_some_and(|ow| ow.grants(required))
    };
    granted(user_id, Permissions::DESK_OWNER) && granted(bot_id, Permissions::DESK_BOT)
}

/// Desk provisioning service
pub struct DeskProvisioner<'a> {
    ctx: &'a DeskContext,
}

impl<'a> DeskProvisioner<'a> {
    /// Create a new DeskProvisioner
    pub fn new(ctx: &'a DeskContext) -> Self {
        Self { ctx }
    }

    /// Create a private voice desk for a member
    ///
    /// A rejected request surfaces as [`DomainError::DeskCreation`] and is not
    /// retried.
    #[instrument(skip(self))]
    pub async fn create_desk(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        display_name: &str,
        category_id: Snowflake,
    ) -> ServiceResult<Channel> {
        let bot_id = self.ctx.bot_id()?;
        let request = CreateChannel::voice(
            display_name,
            category_id,
            desk_overwrites(guild_id, user_id, bot_id),
        );

        let channel = self
            .ctx
            .client()
            .create_channel(guild_id, &request)
            .await
            .map_err(|e| DomainError::DeskCreation {
                user_id,
                reason: e.to_string(),
            })?;

        info!(guild_id = %guild_id, user_id = %user_id, channel_id = %channel.id, "Desk created");
        Ok(channel)
    }

    /// Re-assert the owner and bot grants on an existing desk
    ///
    /// No request is made when both grants already hold. Otherwise a single
    /// edit adds the missing allow bits (clearing them from deny) for the
    /// owner and the bot; every other overwrite is sent back unchanged.
    /// Returns whether an edit was made.
    #[instrument(skip(self, channel), fields(channel_id = %channel.id))]
    pub async fn reset_permissions(
        &self,
        channel: &Channel,
        user_id: Snowflake,
        bot_id: Snowflake,
    ) -> ServiceResult<bool> {
        if grants_hold(channel, user_id, bot_id) {
            debug!("Desk permissions already in place");
            return Ok(false);
        }

        let overwrites = merge_overwrite(
            &channel.permission_overwrites,
            PermissionOverwrite::member(user_id, Permissions::DESK_OWNER, Permissions::empty()),
        );
        let overwrites = merge_overwrite(
            &overwrites,
            PermissionOverwrite::member(bot_id, Permissions::DESK_BOT, Permissions::empty()),
        );

        self.ctx
            .client()
            .edit_channel_overwrites(channel.id, &overwrites)
            .await?;

        info!(user_id = %user_id, "Desk permissions restored");
        Ok(true)
    }
}
