//! Dispatch decoder - turns raw gateway dispatches into desk events

use desk_core::{DeskEvent, Guild, Member, Snowflake, VoiceState};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use super::{GatewayEventType, VoiceStateCache};
use crate::protocol::ReadyPayload;

#[derive(Debug, Deserialize)]
struct UnavailableGuild {
    id: Snowflake,
}

/// Stateful decoder for one gateway connection lifetime
///
/// Must see dispatches in sequence order; the voice cache it maintains is
/// what gives voice updates their `before` channel.
#[derive(Debug, Default)]
pub struct EventDecoder {
    voice: VoiceStateCache,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn voice_cache(&self) -> &VoiceStateCache {
        &self.voice
    }

    /// Decode one dispatch
    ///
    /// Returns `Ok(None)` for dispatches the engine does not act on.
    pub fn decode(&self, event_type: &str, data: Value) -> Result<Option<DeskEvent>, serde_json::Error> {
        let Ok(event_type) = event_type.parse::<GatewayEventType>() else {
            trace!(event = event_type, "Ignoring dispatch");
            return Ok(None);
        };

        let event = match event_type {
            GatewayEventType::Ready => {
                let ready: ReadyPayload = serde_json::from_value(data)?;
                self.voice.clear();
                debug!(session_id = %ready.session_id, "Session ready");
                DeskEvent::Ready { bot_user: ready.user }
            }
            GatewayEventType::GuildCreate => {
                let guild: Guild = serde_json::from_value(data)?;
                if !guild.unavailable {
                    self.voice.seed(guild.id, &guild.voice_states);
                }
                DeskEvent::GuildCreate(Box::new(guild))
            }
            GatewayEventType::GuildDelete => {
                let guild: UnavailableGuild = serde_json::from_value(data)?;
                self.voice.forget_guild(guild.id);
                return Ok(None);
            }
            GatewayEventType::GuildMemberAdd => {
                let member: Member = serde_json::from_value(data)?;
                let Some(guild_id) = member.guild_id else {
                    debug!(user_id = %member.user_id(), "Member add without guild id");
                    return Ok(None);
                };
                DeskEvent::GuildMemberAdd { guild_id, member }
            }
            GatewayEventType::VoiceStateUpdate => {
                let state: VoiceState = serde_json::from_value(data)?;
                let Some(guild_id) = state.guild_id else {
                    return Ok(None);
                };
                let before = self.voice.update(guild_id, state.user_id, state.channel_id);
                DeskEvent::VoiceStateUpdate {
                    guild_id,
                    user_id: state.user_id,
                    before,
                    after: state.channel_id,
                }
            }
        };
        Ok(Some(event))
    }
}
