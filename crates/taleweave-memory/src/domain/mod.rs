//! Domain model for the memory context.

pub mod commands;
pub mod memory;
pub mod ranking;
pub mod repository;
