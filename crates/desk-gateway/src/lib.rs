//! # desk-gateway
//!
//! The platform edge of deskbot: the REST client behind
//! [`desk_core::PlatformClient`], the gateway session that feeds
//! [`desk_core::DeskEvent`]s to the service layer, and the `deskbot` binary.

pub mod bot;
pub mod connection;
pub mod events;
pub mod http;
pub mod protocol;

pub use bot::{create_context, run};
