//! In-memory rate limit store
//!
//! Process-local counters, one per client key and window. A single mutex
//! guards the check and the increment together, so concurrent requests from
//! the same client can never both read a stale count.

use chrono::Utc;
use platform::rate_limit::{RateLimitConfig, RateLimitResult, RateLimitStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

const MIN_CLEANUP_PERIOD: Duration = Duration::from_secs(1);
const MAX_CLEANUP_PERIOD: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    window_start_ms: i64,
    count: u32,
}

#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    windows: Mutex<HashMap<String, WindowCounter>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, WindowCounter>> {
        // A panic while holding the lock cannot leave a counter half-written.
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count one request for `key` at `now_ms`
    pub fn check_and_increment_at(
        &self,
        key: &str,
        config: &RateLimitConfig,
        now_ms: i64,
    ) -> RateLimitResult {
        let window_start_ms = config.window_start_ms(now_ms);
        let reset_at_ms = window_start_ms.saturating_add(config.window_ms());

        let mut windows = self.lock();
        let counter = windows.entry(key.to_string()).or_insert(WindowCounter {
            window_start_ms,
            count: 0,
        });

        if counter.window_start_ms != window_start_ms {
            *counter = WindowCounter {
                window_start_ms,
                count: 0,
            };
        }

        if counter.count >= config.max_requests {
            return RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_at_ms,
            };
        }

        counter.count += 1;
        RateLimitResult {
            allowed: true,
            remaining: config.max_requests - counter.count,
            reset_at_ms,
        }
    }

    /// Drop counters whose window has ended; returns how many were removed
    pub fn cleanup_expired(&self, config: &RateLimitConfig, now_ms: i64) -> usize {
        let current = config.window_start_ms(now_ms);
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, counter| counter.window_start_ms >= current);
        before - windows.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run [`cleanup_expired`](Self::cleanup_expired) once per window, but
    /// no more often than every second and at least hourly
    pub fn spawn_cleanup(self: Arc<Self>, config: RateLimitConfig) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = config.window.clamp(MIN_CLEANUP_PERIOD, MAX_CLEANUP_PERIOD);
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let removed = self.cleanup_expired(&config, Utc::now().timestamp_millis());
                if removed > 0 {
                    tracing::debug!(removed, remaining = self.len(), "Expired rate limit windows dropped");
                }
            }
        })
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.check_and_increment_at(key, config, Utc::now().timestamp_millis()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn test_limit_within_window() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(3, 60);

        for expected_remaining in [2, 1, 0] {
            let result = store.check_and_increment_at("10.0.0.1", &config, T0);
            assert!(result.allowed);
            assert_eq!(result.remaining, expected_remaining);
        }

        let result = store.check_and_increment_at("10.0.0.1", &config, T0 + 1_000);
        assert!(!result.allowed);
        assert_eq!(result.reset_at_ms, config.window_start_ms(T0) + 60_000);
    }

    #[test]
    fn test_next_window_admits_again() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(1, 60);

        assert!(store.check_and_increment_at("k", &config, T0).allowed);
        assert!(!store.check_and_increment_at("k", &config, T0).allowed);

        let next = config.window_start_ms(T0) + 60_000;
        assert!(store.check_and_increment_at("k", &config, next).allowed);
    }

    #[test]
    fn test_clients_are_counted_separately() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(1, 60);

        assert!(store.check_and_increment_at("10.0.0.1", &config, T0).allowed);
        assert!(store.check_and_increment_at("10.0.0.2", &config, T0).allowed);
        assert!(!store.check_and_increment_at("10.0.0.1", &config, T0).allowed);
    }

    #[test]
    fn test_oversized_window_still_enforces_limit() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(1, 10_000_000_000_000_000);

        let first = store.check_and_increment_at("k", &config, T0);
        assert!(first.allowed);
        assert_eq!(first.reset_at_ms, i64::MAX);
        assert!(!store.check_and_increment_at("k", &config, T0 + 1).allowed);
    }

    #[test]
    fn test_zero_limit_rejects_everything() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(0, 60);
        assert!(!store.check_and_increment_at("k", &config, T0).allowed);
    }

    #[test]
    fn test_cleanup_drops_only_stale_windows() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(5, 60);
        let next = config.window_start_ms(T0) + 60_000;

        store.check_and_increment_at("old", &config, T0);
        store.check_and_increment_at("new", &config, next);
        assert_eq!(store.len(), 2);

        assert_eq!(store.cleanup_expired(&config, next), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.check_and_increment_at("new", &config, next).remaining, 3);
    }

    #[test]
    fn test_concurrent_callers_never_over_admit() {
        let store = Arc::new(MemoryRateLimitStore::new());
        let config = RateLimitConfig::new(10, 60);

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                let config = config.clone();
                thread::spawn(move || {
                    (0..8)
                        .filter(|_| store.check_and_increment_at("shared", &config, T0).allowed)
                        .count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 10);
    }

    #[tokio::test]
    async fn test_trait_uses_wall_clock() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(1, 60);

        let before = Utc::now().timestamp_millis();
        let first = store.check_and_increment("k", &config).await.unwrap();
        assert!(first.allowed);
        assert!(first.reset_at_ms > before);
    }
}
