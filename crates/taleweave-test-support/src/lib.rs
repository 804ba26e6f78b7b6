//! Shared test doubles and utilities for the Taleweave story platform.

mod clock;
mod generation;
mod repository;

pub use clock::{FixedClock, fixed_now};
pub use generation::{FailingEmbedder, FailingGenerator, ScriptedGenerator, StubEmbedder};
pub use repository::{
    EmptyEventRepository, FailingEventRepository, InMemoryEventRepository,
    RecordingEventRepository,
};
