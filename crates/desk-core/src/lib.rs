//! # desk-core
//!
//! Domain layer for desk management: identifiers, permission flags, channel
//! and overwrite snapshots, ownership derivation, the platform port, and the
//! inbound event type. No I/O lives here.

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Channel, ChannelType, Guild, Member, OverwriteKind, PermissionOverwrite, User, VoiceState,
};
pub use error::DomainError;
pub use events::DeskEvent;
pub use traits::{CreateChannel, PlatformClient, PlatformResult, MAX_MEMBER_PAGE_SIZE};
pub use value_objects::{Permissions, Snowflake, SnowflakeParseError};
