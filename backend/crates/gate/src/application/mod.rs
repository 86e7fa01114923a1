//! Application Layer
//!
//! Verifiers, admission policy and the pipeline that orders them.

pub mod admission;
pub mod bearer;
pub mod config;
pub mod pipeline;
pub mod signature;

// Re-exports
pub use admission::WindowAdmissionLimiter;
pub use bearer::{BearerTokenVerifier, VerifiedBearer};
pub use config::GateConfig;
pub use pipeline::AuthPipeline;
pub use signature::{SignatureHeaders, SignatureVerifier};
