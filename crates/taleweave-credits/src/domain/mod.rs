//! Domain model for the Credits context.

pub mod aggregates;
pub mod commands;
pub mod events;
