//! In-memory platform used by the unit tests of this crate

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use desk_common::DeskSettings;
use desk_core::{
    Channel, CreateChannel, DomainError, Guild, Member, PermissionOverwrite, PlatformClient,
    PlatformResult, Snowflake, User,
};
use parking_lot::Mutex;

use super::context::{DeskContext, DeskContextBuilder};

pub(crate) const GUILD: Snowflake = Snowflake::new(100);
pub(crate) const CATEGORY: Snowflake = Snowflake::new(200);
pub(crate) const BOT: Snowflake = Snowflake::new(9);

#[derive(Default)]
pub(crate) struct StubState {
    pub channels: BTreeMap<Snowflake, Channel>,
    pub guilds: HashMap<Snowflake, Guild>,
    pub members: Vec<Member>,
    pub created: Vec<CreateChannel>,
    pub edits: Vec<(Snowflake, Vec<PermissionOverwrite>)>,
    pub messages: Vec<(Snowflake, String)>,
    pub member_pages: Vec<(u16, Option<Snowflake>)>,
    pub reject_names: HashSet<String>,
    pub reject_messages: bool,
    next_id: u64,
}

#[derive(Default)]
pub(crate) struct StubPlatform {
    pub state: Mutex<StubState>,
}

impl StubPlatform {
    pub fn put_channel(&self, channel: Channel) {
        self.state.lock().channels.insert(channel.id, channel);
    }

    pub fn channel(&self, id: Snowflake) -> Channel {
        self.state.lock().channels[&id].clone()
    }

    pub fn add_member(&self, id: u64, name: &str) {
        self.state.lock().members.push(Member::new(User::new(Snowflake::new(id), name)));
    }

    pub fn edit_count(&self) -> usize {
        self.state.lock().edits.len()
    }

    pub fn create_count(&self) -> usize {
        self.state.lock().created.len()
    }
}

#[async_trait]
impl PlatformClient for StubPlatform {
    async fn list_guild_channels(&self, guild_id: Snowflake) -> PlatformResult<Vec<Channel>> {
        Ok(self
            .state
            .lock()
            .channels
            .values()
            .filter(|c| c.guild_id == Some(guild_id))
            .cloned()
            .collect())
    }

    async fn get_channel(&self, channel_id: Snowflake) -> PlatformResult<Channel> {
        self.state
            .lock()
            .channels
            .get(&channel_id)
            .cloned()
            .ok_or(DomainError::ChannelNotFound(channel_id))
    }

    async fn get_guild(&self, guild_id: Snowflake) -> PlatformResult<Guild> {
        self.state
            .lock()
            .guilds
            .get(&guild_id)
            .cloned()
            .ok_or(DomainError::GuildNotFound(guild_id))
    }

    async fn create_channel(&self, guild_id: Snowflake, request: &CreateChannel) -> PlatformResult<Channel> {
        let mut state = self.state.lock();
        if state.reject_names.contains(&request.name) {
            return Err(DomainError::remote("create_channel", Some(400), "Invalid Form Body"));
        }

        state.next_id += 1;
        let id = Snowflake::new(5000 + state.next_id);
        let mut channel = Channel::new_voice(id, guild_id, request.name.clone())
            .with_overwrites(request.permission_overwrites.clone());
        channel.parent_id = request.parent_id;

        state.created.push(request.clone());
        state.channels.insert(id, channel.clone());
        Ok(channel)
    }

    async fn edit_channel_overwrites(
        &self,
        channel_id: Snowflake,
        overwrites: &[PermissionOverwrite],
    ) -> PlatformResult<Channel> {
        let mut state = self.state.lock();
        let channel = state
            .channels
            .get_mut(&channel_id)
            .ok_or(DomainError::ChannelNotFound(channel_id))?;
        channel.permission_overwrites = overwrites.to_vec();
        let channel = channel.clone();
        state.edits.push((channel_id, overwrites.to_vec()));
        Ok(channel)
    }

    async fn send_message(&self, channel_id: Snowflake, content: &str) -> PlatformResult<()> {
        let mut state = self.state.lock();
        if state.reject_messages {
            return Err(DomainError::remote("send_message", Some(403), "Missing Access"));
        }
        state.messages.push((channel_id, content.to_string()));
        Ok(())
    }

    async fn list_guild_members(
        &self,
        _guild_id: Snowflake,
        limit: u16,
        after: Option<Snowflake>,
    ) -> PlatformResult<Vec<Member>> {
        let mut state = self.state.lock();
        state.member_pages.push((limit, after));

        let mut members: Vec<Member> = state
            .members
            .iter()
            .filter(|m| after.map_or(true, |after| m.user_id() > after))
            .cloned()
            .collect();
        members.sort_by_key(Member::user_id);
        members.truncate(usize::from(limit));
        Ok(members)
    }
}

/// Context over a fresh stub with the bot identity already known
pub(crate) fn context(settings: DeskSettings) -> (DeskContext, Arc<StubPlatform>) {
    let platform = Arc::new(StubPlatform::default());
    let ctx = DeskContextBuilder::new()
        .client(platform.clone())
        .settings(settings)
        .bot_id(BOT)
        .build()
        .unwrap();
    (ctx, platform)
}
