//! Presentation Layer
//!
//! Middleware, the identity extractor and router wiring.

pub mod extract;
pub mod middleware;
pub mod router;

use std::sync::Arc;

use crate::application::config::GateConfig;
use crate::application::pipeline::AuthPipeline;

pub use extract::AuthenticatedUser;
pub use middleware::{admit_request, authenticate, isolate_failures};
pub use router::{MemoryGate, apply_gate};

/// Shared gate state
pub struct GateState<L> {
    pub limiter: Arc<L>,
    pub pipeline: Arc<AuthPipeline>,
    pub config: Arc<GateConfig>,
}

impl<L> GateState<L> {
    pub fn new(limiter: L, config: GateConfig) -> Self {
        Self {
            limiter: Arc::new(limiter),
            pipeline: Arc::new(AuthPipeline::new(&config)),
            config: Arc::new(config),
        }
    }
}

// Manual impl: `L` itself need not be `Clone`.
impl<L> Clone for GateState<L> {
    fn clone(&self) -> Self {
        Self {
            limiter: self.limiter.clone(),
            pipeline: self.pipeline.clone(),
            config: self.config.clone(),
        }
    }
}
