//! Admission Interface
//!
//! Interface for request-rate admission. Implementations are in the
//! application and infrastructure layers.

use crate::domain::context::ClientIdentity;
use crate::error::GateResult;

/// Outcome of one admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Admitted { remaining: u32 },
    Rejected { retry_after_secs: u64 },
}

/// Request-rate admission gate
#[trait_variant::make(AdmissionLimiter: Send)]
pub trait LocalAdmissionLimiter {
    /// Count one request for `client` and decide whether it may proceed
    ///
    /// The check and the consumption are one atomic step: concurrent callers
    /// can never be admitted past the configured limit.
    async fn check_and_consume(&self, client: &ClientIdentity) -> GateResult<AdmissionDecision>;
}
