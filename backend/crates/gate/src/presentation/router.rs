//! Gate Router Wiring

use axum::{Router, middleware};
use std::sync::Arc;

use crate::application::admission::WindowAdmissionLimiter;
use crate::application::config::GateConfig;
use crate::domain::admission::AdmissionLimiter;
use crate::infra::memory::MemoryRateLimitStore;
use crate::presentation::GateState;
use crate::presentation::middleware::{admit_request, authenticate, isolate_failures};

/// Gate backed by the process-local admission store
pub type MemoryGate = GateState<WindowAdmissionLimiter<MemoryRateLimitStore>>;

impl MemoryGate {
    /// Gate plus a handle on its store, for the cleanup task
    pub fn in_memory(config: GateConfig) -> (Self, Arc<MemoryRateLimitStore>) {
        let store = Arc::new(MemoryRateLimitStore::new());
        let limiter = WindowAdmissionLimiter::new(store.clone(), config.rate_limit.clone());
        (GateState::new(limiter, config), store)
    }
}

/// Put every route of `router` behind the gate
///
/// Layers run outermost first: failure isolation, admission, then
/// authorization.
pub fn apply_gate<S, L>(router: Router<S>, state: GateState<L>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    L: AdmissionLimiter + Send + Sync + 'static,
{
    router
        .layer(middleware::from_fn_with_state(
            state.pipeline.clone(),
            authenticate,
        ))
        .layer(middleware::from_fn_with_state(state, admit_request::<L>))
        .layer(middleware::from_fn(isolate_failures))
}
