//! Inbound platform events consumed by the desk engine

mod desk_event;

pub use desk_event::DeskEvent;
