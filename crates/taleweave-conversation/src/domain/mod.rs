//! Domain model for the conversation context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod prompt;
