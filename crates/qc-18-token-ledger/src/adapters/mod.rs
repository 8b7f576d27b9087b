//! # Adapters
//!
//! In-memory implementations of the outbound ports.

pub mod memory_store;
pub mod settlement;

pub use memory_store::InMemoryKVStore;
pub use settlement::InMemorySettlement;
