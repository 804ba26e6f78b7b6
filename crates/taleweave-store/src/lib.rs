//! Taleweave Store: PostgreSQL persistence.
//!
//! Implements every repository port of the domain crates with `sqlx`, plus
//! the append-only event store behind the event-sourced aggregates.
//! Migrations live in the workspace `migrations/` directory and are embedded
//! as [`MIGRATOR`].

mod sql;

pub mod pg_catalog_repository;
pub mod pg_character_repository;
pub mod pg_event_repository;
pub mod pg_memory_repository;
pub mod pg_user_repository;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");
