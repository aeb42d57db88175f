//! Durable mint status: check-ins, jobs and NFT records.

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod rocks;
pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStatusStore;
pub use rocks::RocksStatusStore;
pub use traits::*;
