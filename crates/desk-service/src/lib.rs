//! # desk-service
//!
//! Application layer: the guild registry, occupancy tracking, desk
//! resolution, provisioning, visibility toggling, and the event handlers
//! that tie them together.

pub mod services;

pub use services::{
    DeskContext, DeskContextBuilder, DeskEventService, DeskProvisioner, DeskResolver,
    DeskVisibility, GuildRegistry, OccupancyStore, OccupancyTracker, ReconcileReport,
    ServiceError, ServiceResult, VisibilityService,
};
