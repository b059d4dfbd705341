//! Desk context - dependency container for services
//!
//! Owns the platform client, the guild registry, the occupancy store, the
//! desk settings, and the bot's own identity. Built once at startup and
//! reset (not rebuilt) on every READY.

use std::sync::Arc;

use desk_common::DeskSettings;
use desk_core::{PlatformClient, Snowflake};
use parking_lot::RwLock;

use super::error::{ServiceError, ServiceResult};
use super::occupancy::{OccupancyStore, OccupancyTracker};
use super::registry::GuildRegistry;

/// Desk context containing all dependencies
///
/// Cheap to clone; every clone shares the same state. Handlers spawned per
/// event each take a clone.
#[derive(Clone)]
pub struct DeskContext {
    client: Arc<dyn PlatformClient>,
    registry: Arc<GuildRegistry>,
    occupancy: Arc<dyn OccupancyStore>,
    settings: Arc<DeskSettings>,
    bot_id: Arc<RwLock<Option<Snowflake>>>,
}

impl DeskContext {
    /// Create a new desk context
    pub fn new(
        client: Arc<dyn PlatformClient>,
        occupancy: Arc<dyn OccupancyStore>,
        settings: DeskSettings,
    ) -> Self {
        Self {
            client,
            registry: Arc::new(GuildRegistry::new()),
            occupancy,
            settings: Arc::new(settings),
            bot_id: Arc::new(RwLock::new(None)),
        }
    }

    /// Get the platform client
    pub fn client(&self) -> &dyn PlatformClient {
        self.client.as_ref()
    }

    /// Get the guild registry
    pub fn registry(&self) -> &GuildRegistry {
        &self.registry
    }

    /// Get the occupancy store
    pub fn occupancy(&self) -> &dyn OccupancyStore {
        self.occupancy.as_ref()
    }

    pub fn settings(&self) -> &DeskSettings {
        &self.settings
    }

    /// The bot's own user id, known once READY has been handled
    pub fn bot_id(&self) -> ServiceResult<Snowflake> {
        (*self.bot_id.read()).ok_or(ServiceError::NotReady)
    }

    /// Start a new session: forget every guild and count, remember who we are
    pub fn reset(&self, bot_id: Snowflake) {
        self.registry.clear();
        self.occupancy.clear();
        *self.bot_id.write() = Some(bot_id);
    }
}

impl std::fmt::Debug for DeskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeskContext")
            .field("client", &"dyn PlatformClient")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .field("bot_id", &*self.bot_id.read())
            .finish()
    }
}

/// Builder for creating DeskContext with custom configuration
pub struct DeskContextBuilder {
    client: Option<Arc<dyn PlatformClient>>,
    occupancy: Option<Arc<dyn OccupancyStore>>,
    settings: Option<DeskSettings>,
    bot_id: Option<Snowflake>,
}

impl DeskContextBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            occupancy: None,
            settings: None,
            bot_id: None,
        }
    }

    pub fn client(mut self, client: Arc<dyn PlatformClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn occupancy(mut self, occupancy: Arc<dyn OccupancyStore>) -> Self {
        self.occupancy = Some(occupancy);
        self
    }

    pub fn settings(mut self, settings: DeskSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Pre-set the bot identity (normally learned from READY)
    pub fn bot_id(mut self, bot_id: Snowflake) -> Self {
        self.bot_id = Some(bot_id);
        self
    }

    /// Build the DeskContext
    ///
    /// Occupancy defaults to an [`OccupancyTracker`], settings to their
    /// defaults.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if the client is missing or the
    /// member page size is out of range
    pub fn build(self) -> ServiceResult<DeskContext> {
        let client = self
            .client
            .ok_or_else(|| ServiceError::validation("client is required"))?;
        let settings = self.settings.unwrap_or_default();
        if !(1..=desk_core::MAX_MEMBER_PAGE_SIZE).contains(&settings.member_page_size) {
            return Err(ServiceError::validation(format!(
                "member_page_size must be between 1 and {}",
                desk_core::MAX_MEMBER_PAGE_SIZE
            )));
        }

        let occupancy = self
            .occupancy
            .unwrap_or_else(|| Arc::new(OccupancyTracker::new()));

        let ctx = DeskContext::new(client, occupancy, settings);
        *ctx.bot_id.write() = self.bot_id;
        Ok(ctx)
    }
}

impl Default for DeskContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
