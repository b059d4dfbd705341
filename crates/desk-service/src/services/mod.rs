//! Desk services
//!
//! Stateless services borrow a [`DeskContext`]; the only shared mutable
//! state is the guild registry and the occupancy store it owns.

pub mod context;
pub mod error;
pub mod events;
pub mod occupancy;
pub mod provisioner;
pub mod registry;
pub mod resolver;
pub mod visibility;

#[cfg(test)]
pub(crate) mod testing;

// Re-export all services for convenience
pub use context::{DeskContext, DeskContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use events::{DeskEventService, ReconcileReport};
pub use occupancy::{OccupancyStore, OccupancyTracker};
pub use provisioner::DeskProvisioner;
pub use registry::GuildRegistry;
pub use resolver::DeskResolver;
pub use visibility::{DeskVisibility, VisibilityService};
