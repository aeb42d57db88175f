//! RocksDB-backed `StatusStore`.
//!
//! See `engine.rs` for lock semantics and `schema.rs` for column families and key layout.

pub mod engine;
pub mod migration;
pub mod schema;
pub mod util;

pub use engine::RocksStatusStore;
