//! Infrastructure Layer
//!
//! Storage backends for the admission counters.

pub mod memory;

pub use memory::MemoryRateLimitStore;
