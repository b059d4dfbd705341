//! Integration test utilities for deskbot
//!
//! Drives the real gateway decoder and service layer against an in-memory
//! platform that records every remote call.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
