//! Desk event service - reacts to the platform's event feed
//!
//! Each handler re-fetches the channels it inspects; nothing about a channel
//! is cached between events.

use desk_core::{Channel, DeskEvent, DomainError, Guild, Member, Snowflake, User};
use tracing::{debug, info, instrument, warn};

use super::context::DeskContext;
use super::error::{ServiceError, ServiceResult};
use super::occupancy::counts_from_voice_states;
use super::provisioner::DeskProvisioner;
use super::resolver::{find_user_desk, warn_if_ambiguous, DeskResolver};
use super::visibility::VisibilityService;

/// Outcome of one reconciliation pass over a guild's members
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Members that had no desk and got one
    pub created: usize,
    /// Desks whose owner or bot grants had to be restored
    pub repaired: usize,
    /// Desks that were already correct
    pub unchanged: usize,
    /// Members whose desk could not be created or repaired
    pub failed: usize,
}

impl ReconcileReport {
    /// Number of members looked at
    pub fn total(&self) -> usize {
        self.created + self.repaired + self.unchanged + self.failed
    }

    /// Number of create/edit requests the pass issued
    pub fn mutations(&self) -> usize {
        self.created + self.repaired
    }
}

enum MemberOutcome {
    Created,
    Repaired,
    Unchanged,
}

/// Desk event service
pub struct DeskEventService<'a> {
    ctx: &'a DeskContext,
}

impl<'a> DeskEventService<'a> {
    /// Create a new DeskEventService
    pub fn new(ctx: &'a DeskContext) -> Self {
        Self { ctx }
    }

    /// Dispatch one event, logging instead of returning failures
    pub async fn handle(&self, event: DeskEvent) {
        let name = event.name();
        let guild_id = event.guild_id();

        let result = match event {
            DeskEvent::Ready { bot_user } => {
                self.on_ready(&bot_user);
                Ok(())
            }
            DeskEvent::GuildCreate(guild) => self.on_guild_create(&guild).await.map(|_| ()),
            DeskEvent::GuildMemberAdd { guild_id, member } => {
                self.on_guild_member_add(guild_id, &member).await.map(|_| ())
            }
            DeskEvent::VoiceStateUpdate {
                guild_id,
                user_id,
                before,
                after,
            } => self.on_voice_state_update(guild_id, user_id, before, after).await,
        };

        if let Err(e) = result {
            match &e {
                ServiceError::Domain(DomainError::GuildNotRegistered(_)) => {
                    debug!(event = name, guild_id = ?guild_id, "Guild has no desk category, ignoring");
                }
                e if e.is_configuration() => {
                    debug!(event = name, guild_id = ?guild_id, code = e.error_code(), "Guild not managed");
                }
                _ => {
                    warn!(event = name, guild_id = ?guild_id, code = e.error_code(), error = %e, "Event handling failed");
                }
            }
        }
    }

    /// A new session started: drop all guild state and remember our identity
    pub fn on_ready(&self, bot_user: &User) {
        self.ctx.reset(bot_user.id);
        info!(bot_id = %bot_user.id, username = %bot_user.username, "Session ready, desk state cleared");
    }

    /// Register a guild's desk category and reconcile every member's desk
    ///
    /// Returns `None` for guilds that are unavailable (outage). A guild
    /// without a desk category is unregistered and reported as
    /// [`DomainError::DeskCategoryMissing`].
    #[instrument(skip(self, guild), fields(guild_id = %guild.id))]
    pub async fn on_guild_create(&self, guild: &Guild) -> ServiceResult<Option<ReconcileReport>> {
        if guild.unavailable {
            debug!("Guild unavailable, skipping");
            return Ok(None);
        }

        let bot_id = self.ctx.bot_id()?;
        let category_name = &self.ctx.settings().category_name;

        let Some(category) = guild.find_category(category_name) else {
            if self.ctx.registry().unregister(guild.id).is_some() {
                info!("Desk category removed, guild no longer managed");
            }
            warn!(category = %category_name, "No desk category found");
            return Err(DomainError::DeskCategoryMissing { guild_id: guild.id }.into());
        };

        self.ctx.registry().register(guild.id, category.id);
        self.ctx
            .occupancy()
            .initialize(guild.id, counts_from_voice_states(&guild.voice_states));
        info!(category_id = %category.id, "Desk category registered");

        let report = self.reconcile_members(guild.id, category.id, bot_id).await?;
        info!(
            created = report.created,
            repaired = report.repaired,
            unchanged = report.unchanged,
            failed = report.failed,
            "Desk reconciliation finished"
        );
        Ok(Some(report))
    }

    /// Make sure every human member of the guild has a correct desk
    ///
    /// Members are paged in id order. One member's failure is counted and
    /// logged; it never stops the pass.
    #[instrument(skip(self))]
    pub async fn reconcile_members(
        &self,
        guild_id: Snowflake,
        category_id: Snowflake,
        bot_id: Snowflake,
    ) -> ServiceResult<ReconcileReport> {
        let client = self.ctx.client();
        let page_size = self.ctx.settings().member_page_size;
        let channels = client.list_guild_channels(guild_id).await?;

        let mut report = ReconcileReport::default();
        let mut after = None;

        loop {
            let page = client.list_guild_members(guild_id, page_size, after).await?;

            for member in page.iter().filter(|m| m.user.is_human()) {
                match self
                    .reconcile_member(guild_id, category_id, bot_id, &channels, member)
                    .await
                {
                    Ok(MemberOutcome::Created) => report.created += 1,
                    Ok(MemberOutcome::Repaired) => report.repaired += 1,
                    Ok(MemberOutcome::Unchanged) => report.unchanged += 1,
                    Err(e) => {
                        report.failed += 1;
                        warn!(user_id = %member.user_id(), code = e.error_code(), error = %e, "Desk reconciliation failed for member");
                    }
                }
            }

            match page.last() {
                Some(last) if page.len() >= usize::from(page_size) => after = Some(last.user_id()),
                _ => break,
            }
        }

        Ok(report)
    }

    async fn reconcile_member(
        &self,
        guild_id: Snowflake,
        category_id: Snowflake,
        bot_id: Snowflake,
        channels: &[Channel],
        member: &Member,
    ) -> ServiceResult<MemberOutcome> {
        let provisioner = DeskProvisioner::new(self.ctx);
        let user_id = member.user_id();

        match find_user_desk(channels, category_id, user_id, bot_id) {
            Some(desk) => {
                warn_if_ambiguous(desk, bot_id);
                if provisioner.reset_permissions(desk, user_id, bot_id).await? {
                    Ok(MemberOutcome::Repaired)
                } else {
                    Ok(MemberOutcome::Unchanged)
                }
            }
            None => {
                provisioner
                    .create_desk(guild_id, user_id, member.display_name(), category_id)
                    .await?;
                Ok(MemberOutcome::Created)
            }
        }
    }

    /// Give a newly joined member a desk
    ///
    /// Returns the created desk, or `None` when the member is a bot or
    /// already owns one (duplicate delivery).
    #[instrument(skip(self, member), fields(user_id = %member.user_id()))]
    pub async fn on_guild_member_add(&self, guild_id: Snowflake, member: &Member) -> ServiceResult<Option<Channel>> {
        if !member.user.is_human() {
            debug!("Bot or system user joined, no desk");
            return Ok(None);
        }

        let category_id = self.ctx.registry().lookup(guild_id)?;
        if DeskResolver::new(self.ctx)
            .find_desk(guild_id, member.user_id())
            .await?
            .is_some()
        {
            debug!("Member already has a desk");
            return Ok(None);
        }

        let name = member.display_name();
        let desk = DeskProvisioner::new(self.ctx)
            .create_desk(guild_id, member.user_id(), name, category_id)
            .await?;

        if self.ctx.settings().announce_new_desks {
            self.announce_desk(guild_id, name).await;
        }

        Ok(Some(desk))
    }

    async fn announce_desk(&self, guild_id: Snowflake, name: &str) {
        let client = self.ctx.client();
        let system_channel = match client.get_guild(guild_id).await {
            Ok(guild) => guild.system_channel_id,
            Err(e) => {
                warn!(guild_id = %guild_id, error = %e, "Could not fetch guild for desk announcement");
                return;
            }
        };

        let Some(channel_id) = system_channel else {
            debug!(guild_id = %guild_id, "No system channel, skipping announcement");
            return;
        };

        if let Err(e) = client
            .send_message(channel_id, &format!("Created a desk for {name}"))
            .await
        {
            warn!(channel_id = %channel_id, error = %e, "Failed to send desk announcement");
        }
    }

    /// Track a voice transition and toggle desk visibility
    ///
    /// The entered and the left channel are handled independently; a failure
    /// or a non-desk channel on one side does not skip the other. The first
    /// error is returned after both sides ran.
    #[instrument(skip(self))]
    pub async fn on_voice_state_update(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        before: Option<Snowflake>,
        after: Option<Snowflake>,
    ) -> ServiceResult<()> {
        self.ctx.registry().lookup(guild_id)?;

        let entered = after.filter(|channel| Some(*channel) != before);
        let left = before.filter(|channel| Some(*channel) != after);

        let mut first_error = None;

        if let Some(channel_id) = entered {
            if let Err(e) = self.enter_desk(guild_id, channel_id).await {
                first_error.get_or_insert(e);
            }
        }

        if let Some(channel_id) = left {
            if let Err(e) = self.leave_desk(guild_id, channel_id).await {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    async fn enter_desk(&self, guild_id: Snowflake, channel_id: Snowflake) -> ServiceResult<()> {
        let Some(desk) = DeskResolver::new(self.ctx).fetch_desk(guild_id, channel_id).await? else {
            debug!(channel_id = %channel_id, "Not a desk channel");
            return Ok(());
        };

        let occupants = self.ctx.occupancy().increment(guild_id, desk.id);
        debug!(channel_id = %desk.id, occupants, "Member connected to desk");

        VisibilityService::new(self.ctx).show_desk(guild_id, &desk).await?;
        Ok(())
    }

    async fn leave_desk(&self, guild_id: Snowflake, channel_id: Snowflake) -> ServiceResult<()> {
        let Some(desk) = DeskResolver::new(self.ctx).fetch_desk(guild_id, channel_id).await? else {
            debug!(channel_id = %channel_id, "Not a desk channel");
            return Ok(());
        };

        let occupants = self.ctx.occupancy().decrement(guild_id, desk.id);
        debug!(channel_id = %desk.id, occupants, "Member disconnected from desk");

        if occupants == 0 {
            VisibilityService::new(self.ctx).hide_desk(guild_id, &desk).await?;
        }
        Ok(())
    }
}
