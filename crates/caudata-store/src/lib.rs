//! Caudata Store - Response cache port and adapters
//!
//! Remote responses (GBIF pages, terrain tiles) are cached between runs behind
//! the `ResponseCache` port, with an in-memory adapter for tests and a
//! filesystem adapter for the CLI.

pub mod file;
pub mod memory;
pub mod ports;

pub use file::FileCache;
pub use memory::MemoryCache;
pub use ports::{CacheStats, ResponseCache};
