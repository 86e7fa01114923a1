//! Domain Layer
//!
//! Identity claims, the request-scoped context that carries them, and the
//! admission interface.

pub mod admission;
pub mod claims;
pub mod context;

// Re-exports
pub use admission::{AdmissionDecision, AdmissionLimiter};
pub use claims::{Claims, UserLogin};
pub use context::{ClientIdentity, GateStage, RequestContext};
