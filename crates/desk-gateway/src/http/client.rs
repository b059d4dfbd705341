//! Platform REST client
//!
//! Implements [`PlatformClient`] over the v10 REST API. Every failure is
//! mapped into [`DomainError`]; nothing is retried, including rate limits.

use std::time::Duration;

use async_trait::async_trait;
use desk_common::{AppError, AppResult, ConfigError};
use desk_core::{
    Channel, CreateChannel, DomainError, Guild, Member, PermissionOverwrite, PlatformClient,
    PlatformResult, Snowflake, MAX_MEMBER_PAGE_SIZE,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const USER_AGENT: &str = concat!(
    "DiscordBot (",
    env!("CARGO_PKG_NAME"),
    ", ",
    env!("CARGO_PKG_VERSION"),
    ")"
);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Resource a request addresses; a 404 on it becomes the matching not-found error
#[derive(Debug, Clone, Copy)]
enum Target {
    Guild(Snowflake),
    Channel(Snowflake),
}

impl Target {
    fn not_found(self) -> DomainError {
        match self {
            Self::Guild(id) => DomainError::GuildNotFound(id),
            Self::Channel(id) => DomainError::ChannelNotFound(id),
        }
    }
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    code: u32,
}

#[derive(Serialize)]
struct EditOverwrites<'a> {
    permission_overwrites: &'a [PermissionOverwrite],
}

#[derive(Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

fn remote_error(operation: &'static str, target: Target, status: StatusCode, body: &str) -> DomainError {
    if status == StatusCode::NOT_FOUND {
        return target.not_found();
    }

    let message = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(api) if api.code != 0 => format!("{} (code {})", api.message, api.code),
        Ok(api) => api.message,
        Err(_) if !body.is_empty() => body.to_string(),
        Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
    };
    DomainError::remote(operation, Some(status.as_u16()), message)
}

/// REST client authenticated as a bot
#[derive(Clone)]
pub struct HttpPlatformClient {
    http_client: reqwest::Client,
    api_url: String,
}

impl HttpPlatformClient {
    /// Create a new client
    ///
    /// `api_url` is the versioned API root, e.g. `https://discord.com/api/v10`.
    pub fn new(api_url: impl Into<String>, token: &str) -> AppResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bot {token}")).map_err(|_| {
            ConfigError::InvalidValue("DESK_BOT_TOKEN", "contains invalid characters".to_string())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Http(e.to_string()))?;

        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build the URL of an API route
    fn api(&self, route: &str) -> String {
        format!("{}{}", self.api_url, route)
    }

    fn members_url(&self, guild_id: Snowflake, limit: u16, after: Option<Snowflake>) -> String {
        let limit = limit.clamp(1, MAX_MEMBER_PAGE_SIZE);
        let mut url = self.api(&format!("/guilds/{guild_id}/members?limit={limit}"));
        if let Some(after) = after {
            url.push_str(&format!("&after={after}"));
        }
        url
    }

    /// Send a request and decode the JSON response
    async fn call<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        target: Target,
        request: RequestBuilder,
    ) -> PlatformResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| DomainError::remote(operation, e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = remote_error(operation, target, status, &body);
            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!(operation, "Rate limited by the platform");
            }
            debug!(operation, status = status.as_u16(), error = %err, "Request rejected");
            return Err(err);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DomainError::remote(operation, Some(status.as_u16()), format!("invalid response body: {e}")))
    }
}

impl std::fmt::Debug for HttpPlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPlatformClient")
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    async fn list_guild_channels(&self, guild_id: Snowflake) -> PlatformResult<Vec<Channel>> {
        let url = self.api(&format!("/guilds/{guild_id}/channels"));
        self.call("list_guild_channels", Target::Guild(guild_id), self.http_client.get(url))
            .await
    }

    async fn get_channel(&self, channel_id: Snowflake) -> PlatformResult<Channel> {
        let url = self.api(&format!("/channels/{channel_id}"));
        self.call("get_channel", Target::Channel(channel_id), self.http_client.get(url))
            .await
    }

    async fn get_guild(&self, guild_id: Snowflake) -> PlatformResult<Guild> {
        let url = self.api(&format!("/guilds/{guild_id}"));
        self.call("get_guild", Target::Guild(guild_id), self.http_client.get(url))
            .await
    }

    async fn create_channel(&self, guild_id: Snowflake, request: &CreateChannel) -> PlatformResult<Channel> {
        let url = self.api(&format!("/guilds/{guild_id}/channels"));
        self.call(
            "create_channel",
            Target::Guild(guild_id),
            self.http_client.post(url).json(request),
        )
        .await
    }

    async fn edit_channel_overwrites(
        &self,
        channel_id: Snowflake,
        overwrites: &[PermissionOverwrite],
    ) -> PlatformResult<Channel> {
        let url = self.api(&format!("/channels/{channel_id}"));
        let body = EditOverwrites {
            permission_overwrites: overwrites,
        };
        self.call(
            "edit_channel_overwrites",
            Target::Channel(channel_id),
            self.http_client.patch(url).json(&body),
        )
        .await
    }

    async fn send_message(&self, channel_id: Snowflake, content: &str) -> PlatformResult<()> {
        let url = self.api(&format!("/channels/{channel_id}/messages"));
        let _: IgnoredAny = self
            .call(
                "send_message",
                Target::Channel(channel_id),
                self.http_client.post(url).json(&CreateMessage { content }),
            )
            .await?;
        Ok(())
    }

    async fn list_guild_members(
        &self,
        guild_id: Snowflake,
        limit: u16,
        after: Option<Snowflake>,
    ) -> PlatformResult<Vec<Member>> {
        let url = self.members_url(guild_id, limit, after);
        self.call("list_guild_members", Target::Guild(guild_id), self.http_client.get(url))
            .await
    }
}
