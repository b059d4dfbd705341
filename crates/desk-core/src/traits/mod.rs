//! Ports - interfaces the domain needs from the outside world

mod platform;

pub use platform::{CreateChannel, PlatformClient, PlatformResult, MAX_MEMBER_PAGE_SIZE};
