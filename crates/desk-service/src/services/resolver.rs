//! Desk resolver - finds the desk a member owns

use desk_core::entities::overwrite::owner_candidates;
use desk_core::{Channel, Snowflake};
use tracing::{instrument, warn};

use super::context::DeskContext;
use super::error::ServiceResult;

/// Find the desk owned by `user_id` among `channels`
///
/// A desk is any channel directly under `category_id`; its owner is derived
/// from its overwrites (see [`Channel::owner`]). If the user somehow owns
/// several desks, the one with the lowest channel id is returned.
pub fn find_user_desk(
    channels: &[Channel],
    category_id: Snowflake,
    user_id: Snowflake,
    bot_id: Snowflake,
) -> Option<&Channel> {
    channels
        .iter()
        .filter(|c| c.is_in_category(category_id) && c.owner(bot_id) == Some(user_id))
        .min_by_key(|c| c.id)
}

/// Log a channel whose overwrites name more than one owner
///
/// Returns `true` when the channel is ambiguous.
pub fn warn_if_ambiguous(channel: &Channel, bot_id: Snowflake) -> bool {
    let candidates = owner_candidates(&channel.permission_overwrites, bot_id);
    if candidates.len() > 1 {
        warn!(
            channel_id = %channel.id,
            candidates = ?candidates,
            chosen = %candidates[0],
            "Desk has several owner overwrites, using the lowest id"
        );
        return true;
    }
    false
}

/// Desk resolver service
pub struct DeskResolver<'a> {
    ctx: &'a DeskContext,
}

impl<'a> DeskResolver<'a> {
    /// Create a new DeskResolver
    pub fn new(ctx: &'a DeskContext) -> Self {
        Self { ctx }
    }

    /// Fetch the guild's channels and find the user's desk
    ///
    /// Fails if the guild has no registered desk category.
    #[instrument(skip(self))]
    pub async fn find_desk(&self, guild_id: Snowflake, user_id: Snowflake) -> ServiceResult<Option<Channel>> {
        let bot_id = self.ctx.bot_id()?;
        let category_id = self.ctx.registry().lookup(guild_id)?;
        let channels = self.ctx.client().list_guild_channels(guild_id).await?;

        let desk = find_user_desk(&channels, category_id, user_id, bot_id).cloned();
        if let Some(desk) = &desk {
            warn_if_ambiguous(desk, bot_id);
        }
        Ok(desk)
    }

    /// Fetch a channel and return it only if it is a desk of the guild
    #[instrument(skip(self))]
    pub async fn fetch_desk(&self, guild_id: Snowflake, channel_id: Snowflake) -> ServiceResult<Option<Channel>> {
        let category_id = self.ctx.registry().lookup(guild_id)?;
        let channel = self.ctx.client().get_channel(channel_id).await?;
        Ok(channel.is_in_category(category_id).then_some(channel))
    }
}
