//! Domain model for the catalog context.

pub mod commands;
pub mod content_pack;
pub mod episode;
pub mod image;
pub mod repository;
pub mod series;
pub mod slug;
pub mod world;
