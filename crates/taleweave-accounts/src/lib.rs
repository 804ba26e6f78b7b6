//! Taleweave: Accounts bounded context.
//!
//! Responsible for member profiles, the admin allow-list, and the platform
//! statistics shown to admins.

pub mod application;
pub mod domain;
pub mod in_memory;
