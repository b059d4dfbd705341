//! REST client for the platform API

mod client;

pub use client::HttpPlatformClient;
