//! Taleweave: Characters bounded context.
//!
//! Responsible for character definitions and their conversation ignition:
//! the opening situation, first line and starter prompts derived once from a
//! character's static definition.

pub mod application;
pub mod domain;
pub mod in_memory;
