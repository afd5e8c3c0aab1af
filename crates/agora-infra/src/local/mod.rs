//! Local key/value storage for per-viewer flags.

mod memory;

pub use memory::InMemoryLocalStore;
