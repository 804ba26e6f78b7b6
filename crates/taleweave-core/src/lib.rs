//! Taleweave Core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that all bounded
//! contexts depend on: errors, time, event sourcing, viewer identity, and the
//! ports through which text generation and embeddings are reached. It
//! contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod generation;
pub mod identity;
pub mod repository;
