//! Taleweave: Story catalog bounded context.
//!
//! Responsible for the authored content players browse and play: worlds,
//! series, episode templates with their beats, image metadata, and the
//! content-pack import that seeds all of it.

pub mod application;
pub mod domain;
pub mod in_memory;
