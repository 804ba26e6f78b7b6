//! Application layer for the conversation context.

pub mod command_handlers;
pub mod query_handlers;
