//! Application layer for the characters context.

pub mod command_handlers;
pub mod query_handlers;
