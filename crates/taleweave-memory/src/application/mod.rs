//! Application layer for the memory context.

pub mod command_handlers;
pub mod query_handlers;
