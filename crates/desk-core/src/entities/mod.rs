//! Domain entities - snapshots of platform objects

mod channel;
mod guild;
mod member;
pub mod overwrite;
mod voice_state;

pub use channel::{Channel, ChannelType};
pub use guild::Guild;
pub use member::{Member, User};
pub use overwrite::{OverwriteKind, PermissionOverwrite};
pub use voice_state::VoiceState;
