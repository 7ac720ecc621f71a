//! Content store implementations.

mod memory;

pub use memory::InMemoryContentStore;
