//! Application layer for the Credits context.

pub mod command_handlers;
pub mod query_handlers;
