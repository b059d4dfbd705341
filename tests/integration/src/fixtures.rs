//! Test fixtures: an in-memory platform and guild builders

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use desk_core::{
    Channel, CreateChannel, DomainError, Guild, Member, PermissionOverwrite, Permissions,
    PlatformClient, PlatformResult, Snowflake, User, VoiceState,
};
use parking_lot::Mutex;

pub const GUILD: Snowflake = Snowflake::new(100);
pub const CATEGORY: Snowflake = Snowflake::new(200);
pub const SYSTEM_CHANNEL: Snowflake = Snowflake::new(150);
pub const BOT: Snowflake = Snowflake::new(9);

/// Counter for channels created during a test
static CHANNEL_COUNTER: AtomicU64 = AtomicU64::new(10_000);

/// A fresh channel id, unique across the test binary
pub fn next_channel_id() -> Snowflake {
    Snowflake::new(CHANNEL_COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Remote call as seen by the platform
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListChannels(Snowflake),
    GetChannel(Snowflake),
    GetGuild(Snowflake),
    CreateChannel(Snowflake, CreateChannel),
    EditOverwrites(Snowflake, Vec<PermissionOverwrite>),
    SendMessage(Snowflake, String),
    ListMembers {
        guild_id: Snowflake,
        limit: u16,
        after: Option<Snowflake>,
    },
}

impl Call {
    /// Whether the call changes platform state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateChannel(..) | Self::EditOverwrites(..) | Self::SendMessage(..)
        )
    }
}

#[derive(Default)]
struct PlatformState {
    channels: BTreeMap<Snowflake, Channel>,
    guilds: HashMap<Snowflake, Guild>,
    members: Vec<Member>,
    calls: Vec<Call>,
    failing_creates: HashSet<String>,
}

/// In-memory platform recording every call made through [`PlatformClient`]
#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<PlatformState>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_guild(&self, guild: &Guild) {
        let mut state = self.state.lock();
        for channel in &guild.channels {
            state.channels.insert(channel.id, channel.clone());
        }
        let mut stored = guild.clone();
        stored.channels.clear();
        stored.voice_states.clear();
        state.guilds.insert(guild.id, stored);
    }

    pub fn insert_channel(&self, channel: Channel) {
        self.state.lock().channels.insert(channel.id, channel);
    }

    pub fn remove_channel(&self, id: Snowflake) {
        self.state.lock().channels.remove(&id);
    }

    pub fn add_member(&self, member: Member) {
        self.state.lock().members.push(member);
    }

    /// Reject channel creation for members with this display name
    pub fn fail_creates_named(&self, name: &str) {
        self.state.lock().failing_creates.insert(name.to_string());
    }

    pub fn channel(&self, id: Snowflake) -> Option<Channel> {
        self.state.lock().channels.get(&id).cloned()
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.state.lock().channels.values().cloned().collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn creates(&self) -> Vec<CreateChannel> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateChannel(_, request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn edits_of(&self, channel_id: Snowflake) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::EditOverwrites(id, _) if *id == channel_id))
            .count()
    }

    pub fn messages(&self) -> Vec<(Snowflake, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SendMessage(channel, content) => Some((channel, content)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.lock().calls.push(call);
    }
}

#[async_trait]
impl PlatformClient for FakePlatform {
    async fn list_guild_channels(&self, guild_id: Snowflake) -> PlatformResult<Vec<Channel>> {
        self.record(Call::ListChannels(guild_id));
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
        self.record(Call::GetChannel(channel_id));
        self.channel(channel_id)
            .ok_or(DomainError::ChannelNotFound(channel_id))
    }

    async fn get_guild(&self, guild_id: Snowflake) -> PlatformResult<Guild> {
        self.record(Call::GetGuild(guild_id));
        self.state
            .lock()
            .guilds
            .get(&guild_id)
            .cloned()
            .ok_or(DomainError::GuildNotFound(guild_id))
    }

    async fn create_channel(&self, guild_id: Snowflake, request: &CreateChannel) -> PlatformResult<Channel> {
        self.record(Call::CreateChannel(guild_id, request.clone()));
        let mut state = self.state.lock();
        if state.failing_creates.contains(&request.name) {
            return Err(DomainError::remote("create_channel", Some(403), "Missing Permissions"));
        }

        let mut channel = Channel::new_voice(next_channel_id(), guild_id, request.name.clone())
            .with_overwrites(request.permission_overwrites.clone());
        channel.parent_id = request.parent_id;
        state.channels.insert(channel.id, channel.clone());
        Ok(channel)
    }

    async fn edit_channel_overwrites(
        &self,
        channel_id: Snowflake,
        overwrites: &[PermissionOverwrite],
    ) -> PlatformResult<Channel> {
        self.record(Call::EditOverwrites(channel_id, overwrites.to_vec()));
        let mut state = self.state.lock();
        let channel = state
            .channels
            .get_mut(&channel_id)
            .ok_or(DomainError::ChannelNotFound(channel_id))?;
        channel.permission_overwrites = overwrites.to_vec();
        Ok(channel.clone())
    }

    async fn send_message(&self, channel_id: Snowflake, content: &str) -> PlatformResult<()> {
        self.record(Call::SendMessage(channel_id, content.to_string()));
        Ok(())
    }

    async fn list_guild_members(
        &self,
        guild_id: Snowflake,
        limit: u16,
        after: Option<Snowflake>,
    ) -> PlatformResult<Vec<Member>> {
        self.record(Call::ListMembers { guild_id, limit, after });
        let state = self.state.lock();
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

/// A human member
pub fn member(id: u64, name: &str) -> Member {
    Member::new(User::new(Snowflake::new(id), name))
}

/// A bot member
pub fn bot_member(id: u64, name: &str) -> Member {
    let mut user = User::new(Snowflake::new(id), name);
    user.bot = true;
    Member::new(user)
}

/// The overwrites a desk owned by `owner` is created with
pub fn desk_overwrites(owner: Snowflake) -> Vec<PermissionOverwrite> {
    vec![
        PermissionOverwrite::member(owner, Permissions::DESK_OWNER, Permissions::empty()),
        PermissionOverwrite::member(BOT, Permissions::DESK_BOT, Permissions::empty()),
        PermissionOverwrite::role(GUILD, Permissions::empty(), Permissions::VIEW_CHANNEL),
    ]
}

/// A hidden desk under the test category
pub fn desk(id: u64, owner: Snowflake, name: &str) -> Channel {
    Channel::new_voice(Snowflake::new(id), GUILD, name)
        .with_parent(CATEGORY)
        .with_overwrites(desk_overwrites(owner))
}

/// Builder for guild-create snapshots
pub struct GuildBuilder {
    guild: Guild,
}

impl GuildBuilder {
    /// A guild with a system channel and a category named `category_name`
    pub fn new(category_name: &str) -> Self {
        let mut guild = Guild::new(GUILD, "Office");
        guild.system_channel_id = Some(SYSTEM_CHANNEL);
        guild
            .channels
            .push(Channel::new_category(CATEGORY, GUILD, category_name));
        Self { guild }
    }

    /// A guild without any desk category
    pub fn without_category() -> Self {
        let mut guild = Guild::new(GUILD, "Office");
        guild.system_channel_id = Some(SYSTEM_CHANNEL);
        Self { guild }
    }

    pub fn channel(mut self, channel: Channel) -> Self {
        self.guild.channels.push(channel);
        self
    }

    pub fn voice_state(mut self, user_id: Snowflake, channel_id: Snowflake) -> Self {
        self.guild
            .voice_states
            .push(VoiceState::connected(user_id, channel_id));
        self
    }

    pub fn build(self) -> Guild {
        self.guild
    }
}
