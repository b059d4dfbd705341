//! Gateway protocol definitions
//!
//! Op codes, message envelope, payloads and close codes of the platform's
//! gateway.

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{HelloPayload, IdentifyPayload, IdentifyProperties, Intents, ReadyPayload};
