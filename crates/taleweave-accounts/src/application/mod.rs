//! Application layer for the accounts context.

pub mod command_handlers;
pub mod query_handlers;
