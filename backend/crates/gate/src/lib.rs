//! Gate - request authentication/authorization for the identity service
//!
//! Clean Architecture structure:
//! - `domain/` - Claims, request-scoped context, admission interface
//! - `application/` - Verifiers, admission policy, pipeline orchestration
//! - `infra/` - In-memory admission store
//! - `presentation/` - Axum middleware, extractor, router wiring
//!
//! ## Request flow
//! ```text
//! request
//!   → isolate_failures   (panic → 500, outermost)
//!   → admit_request      (per-client fixed window → 429)
//!   → authenticate       (bearer token, then request signature → 401)
//!   → business handler   (reads AuthenticatedUser)
//! ```
//!
//! ## Security Model
//! - Tokens are HMAC-signed JWTs; any other algorithm tag is rejected
//! - A second factor, `sha256(service:secret:timestamp)`, must match as well
//! - Rejections share one envelope and never carry internal detail
//! - Secrets live in an immutable [`GateConfig`] injected at construction

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{ConfigError, GateConfig};
pub use application::{AuthPipeline, BearerTokenVerifier, SignatureVerifier, WindowAdmissionLimiter};
pub use domain::{
    AdmissionDecision, AdmissionLimiter, Claims, ClientIdentity, GateStage, RequestContext,
    UserLogin,
};
pub use error::{GateError, GateResult};
pub use infra::memory::MemoryRateLimitStore;
pub use presentation::router::{MemoryGate, apply_gate};
pub use presentation::{AuthenticatedUser, GateState};

// Re-export kernel types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
pub use kernel::response::ApiResponse;

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
