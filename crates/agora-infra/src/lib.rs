//! # Agora Infrastructure
//!
//! Concrete implementations of the ports defined in `agora-core`.
//! Everything here is in-process: record stores and the local flag store
//! keep their data in memory and lose it on restart.
//!
//! ## Feature Flags
//!
//! - `fixtures` (default) - Bundled JSON seed data for the record stores

pub mod local;
pub mod store;
pub mod tasks;

#[cfg(feature = "fixtures")]
pub mod fixtures;

// Re-exports
pub use local::InMemoryLocalStore;
pub use store::{InMemoryRepository, InMemoryStores};
pub use tasks::IntervalTask;

#[cfg(feature = "fixtures")]
pub use fixtures::{FixtureError, Seed};
