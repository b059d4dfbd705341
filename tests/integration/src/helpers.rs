//! Test helpers for integration tests
//!
//! [`TestBot`] feeds raw gateway dispatches through the real decoder and
//! hands the resulting events to the service layer, the same path a live
//! session takes minus the socket.

use std::sync::Arc;

use desk_common::DeskSettings;
use desk_core::{Channel, Guild, Member, Snowflake};
use desk_gateway::events::EventDecoder;
use desk_service::{DeskContext, DeskContextBuilder, DeskEventService, DeskVisibility};
use serde_json::{json, Value};

use crate::fixtures::{FakePlatform, BOT, GUILD};

/// Service stack wired to a [`FakePlatform`]
pub struct TestBot {
    pub platform: Arc<FakePlatform>,
    pub ctx: DeskContext,
    decoder: EventDecoder,
}

impl TestBot {
    /// Start a bot with default settings
    pub fn new() -> Self {
        Self::with_settings(DeskSettings::default())
    }

    /// Start a bot with custom desk settings
    pub fn with_settings(settings: DeskSettings) -> Self {
        let platform = Arc::new(FakePlatform::new());
        let ctx = DeskContextBuilder::new()
            .client(platform.clone())
            .settings(settings)
            .build()
            .expect("Failed to build desk context");

        Self {
            platform,
            ctx,
            decoder: EventDecoder::new(),
        }
    }

    /// Decode a raw dispatch and handle it to completion
    pub async fn dispatch(&self, event_type: &str, data: Value) {
        let event = self
            .decoder
            .decode(event_type, data)
            .expect("Failed to decode dispatch");
        if let Some(event) = event {
            DeskEventService::new(&self.ctx).handle(event).await;
        }
    }

    pub async fn ready(&self) {
        self.dispatch(
            "READY",
            json!({
                "v": 10,
                "session_id": "test-session",
                "user": {"id": BOT, "username": "deskbot", "bot": true},
                "guilds": [{"id": GUILD, "unavailable": true}]
            }),
        )
        .await;
    }

    /// Make the guild known to the platform and deliver its guild-create
    pub async fn guild_create(&self, guild: &Guild) {
        self.platform.insert_guild(guild);
        let data = serde_json::to_value(guild).expect("Failed to serialize guild");
        self.dispatch("GUILD_CREATE", data).await;
    }

    /// READY followed by the guild-create, as after any (re)connect
    pub async fn connect(&self, guild: &Guild) {
        self.ready().await;
        self.guild_create(guild).await;
    }

    /// Reconnect: READY and a guild-create, leaving platform state untouched
    pub async fn resync(&self, guild: &Guild) {
        self.ready().await;
        let data = serde_json::to_value(guild).expect("Failed to serialize guild");
        self.dispatch("GUILD_CREATE", data).await;
    }

    /// Add a member to the platform and deliver the member-add
    pub async fn member_join(&self, member: &Member) {
        self.platform.add_member(member.clone());
        let mut data = serde_json::to_value(member).expect("Failed to serialize member");
        data["guild_id"] = json!(GUILD);
        self.dispatch("GUILD_MEMBER_ADD", data).await;
    }

    pub async fn join_voice(&self, user_id: Snowflake, channel_id: Snowflake) {
        self.voice_update(user_id, Some(channel_id)).await;
    }

    pub async fn leave_voice(&self, user_id: Snowflake) {
        self.voice_update(user_id, None).await;
    }

    async fn voice_update(&self, user_id: Snowflake, channel_id: Option<Snowflake>) {
        self.dispatch(
            "VOICE_STATE_UPDATE",
            json!({
                "guild_id": GUILD,
                "user_id": user_id,
                "channel_id": channel_id,
                "session_id": "voice-session",
                "self_mute": false,
                "self_deaf": false
            }),
        )
        .await;
    }

    pub fn occupants(&self, channel_id: Snowflake) -> u32 {
        self.ctx.occupancy().count(GUILD, channel_id)
    }

    /// Current visibility of a desk as stored on the platform
    pub fn visibility(&self, channel_id: Snowflake) -> DeskVisibility {
        DeskVisibility::of(&self.desk(channel_id), GUILD)
    }

    pub fn desk(&self, channel_id: Snowflake) -> Channel {
        self.platform
            .channel(channel_id)
            .expect("Desk does not exist on the platform")
    }
}

impl Default for TestBot {
    fn default() -> Self {
        Self::new()
    }
}
