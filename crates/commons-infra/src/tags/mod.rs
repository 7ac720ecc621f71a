//! Tag catalog implementations.

mod memory;

pub use memory::InMemoryTagCatalog;
