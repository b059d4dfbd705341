//! Gateway events
//!
//! Decoding of the dispatches the desk engine listens to.

mod decoder;
mod event_types;
mod voice_cache;

pub use decoder::EventDecoder;
pub use event_types::{GatewayEventType, UnhandledEvent};
pub use voice_cache::VoiceStateCache;
