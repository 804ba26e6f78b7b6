//! Domain model for the accounts context.

pub mod admin;
pub mod profile;
pub mod repository;
