//! Window Admission
//!
//! [`AdmissionLimiter`] on top of any platform [`RateLimitStore`].

use chrono::Utc;
use platform::rate_limit::{RateLimitConfig, RateLimitStore};
use std::sync::Arc;

use crate::domain::admission::{AdmissionDecision, AdmissionLimiter};
use crate::domain::context::ClientIdentity;
use crate::error::{GateError, GateResult};

/// Fixed-window admission per client
pub struct WindowAdmissionLimiter<S>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    store: Arc<S>,
    config: RateLimitConfig,
}

impl<S> WindowAdmissionLimiter<S>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }
}

impl<S> AdmissionLimiter for WindowAdmissionLimiter<S>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    async fn check_and_consume(&self, client: &ClientIdentity) -> GateResult<AdmissionDecision> {
        let result = self
            .store
            .check_and_increment(client.as_str(), &self.config)
            .await
            .map_err(|e| GateError::AdmissionStore(e.to_string()))?;

        if result.allowed {
            return Ok(AdmissionDecision::Admitted {
                remaining: result.remaining,
            });
        }

        let now_ms = Utc::now().timestamp_millis();
        Ok(AdmissionDecision::Rejected {
            // Never advertise an immediate retry while still rejecting.
            retry_after_secs: result.retry_after_secs(now_ms).max(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::rate_limit::RateLimitResult;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Admits the first `limit` calls, then rejects with a reset 1.5s out
    struct CountingStore {
        limit: u32,
        calls: AtomicU32,
    }

    impl RateLimitStore for CountingStore {
        async fn check_and_increment(
            &self,
            _key: &str,
            config: &RateLimitConfig,
        ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>> {
            let count = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let now_ms = Utc::now().timestamp_millis();
            Ok(RateLimitResult {
                allowed: count <= self.limit,
                remaining: self.limit.saturating_sub(count),
                reset_at_ms: now_ms + config.window_ms().min(1_500),
            })
        }
    }

    struct BrokenStore;

    impl RateLimitStore for BrokenStore {
        async fn check_and_increment(
            &self,
            _key: &str,
            _config: &RateLimitConfig,
        ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>> {
            Err("connection refused".into())
        }
    }

    #[tokio::test]
    async fn test_admits_then_rejects() {
        let store = Arc::new(CountingStore {
            limit: 2,
            calls: AtomicU32::new(0),
        });
        let limiter = WindowAdmissionLimiter::new(store, RateLimitConfig::new(2, 60));
        let client = ClientIdentity::new("10.0.0.1");

        assert_eq!(
            limiter.check_and_consume(&client).await.unwrap(),
            AdmissionDecision::Admitted { remaining: 1 }
        );
        assert_eq!(
            limiter.check_and_consume(&client).await.unwrap(),
            AdmissionDecision::Admitted { remaining: 0 }
        );

        match limiter.check_and_consume(&client).await.unwrap() {
            AdmissionDecision::Rejected { retry_after_secs } => {
                assert!((1..=2).contains(&retry_after_secs));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_store_failure_fails_closed() {
        let limiter = WindowAdmissionLimiter::new(Arc::new(BrokenStore), RateLimitConfig::default());
        let err = limiter
            .check_and_consume(&ClientIdentity::unknown())
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::AdmissionStore(ref msg) if msg == "connection refused"));
    }
}
