//! Domain model for the characters context.

pub mod character;
pub mod commands;
pub mod ignition;
pub mod repository;
