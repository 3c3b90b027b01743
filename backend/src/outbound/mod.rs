//! Outbound adapters: persistence implementations of the domain ports.

pub mod memory;
pub mod persistence;

pub use memory::MemoryStore;
