//! Taleweave: Memory bounded context.
//!
//! Responsible for what characters remember about a player: memories are
//! written immediately, embedded in the background, and recalled by
//! similarity to the current message.

pub mod application;
pub mod domain;
pub mod in_memory;
