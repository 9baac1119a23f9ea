//! Retry policy and request accounting for paginated pulls.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use netfile_api::Endpoint;
use rand::Rng;
use tokio::time::sleep;

use super::FetchError;

/// Bounded exponential backoff.
///
/// Attempt `n` (1-based) that fails transiently waits
/// `base_delay * 2^(n-1)`, capped at `max_delay`, scaled by a random
/// factor in `0.8..1.2` when `jitter` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(60_000),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Reads `NETFILE_RETRY_MAX`, `NETFILE_RETRY_BASE_MS` and
    /// `NETFILE_RETRY_MAX_MS`, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: env_u64("NETFILE_RETRY_MAX", defaults.max_attempts as u64).max(1)
                as u32,
            base_delay: Duration::from_millis(env_u64(
                "NETFILE_RETRY_BASE_MS",
                defaults.base_delay.as_millis() as u64,
            )),
            max_delay: Duration::from_millis(env_u64(
                "NETFILE_RETRY_MAX_MS",
                defaults.max_delay.as_millis() as u64,
            )),
            jitter: true,
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(30);
        let base_ms = self.base_delay.as_millis() as u64;
        let capped = base_ms
            .saturating_mul(1u64 << shift)
            .min(self.max_delay.as_millis() as u64);
        if !self.jitter {
            return Duration::from_millis(capped);
        }
        let factor = rand::thread_rng().gen_range(0.8..1.2);
        Duration::from_millis((capped as f64 * factor) as u64)
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}

/// Atomic counters tracking request outcomes across a whole run.
#[derive(Default)]
pub struct FetchTracker {
    requests_made: AtomicU64,
    requests_succeeded: AtomicU64,
    requests_retried: AtomicU64,
    requests_failed: AtomicU64,
    queries_downgraded: AtomicU64,
    parents_skipped: AtomicU64,
    /// Cumulative backoff time in milliseconds.
    total_backoff_ms: AtomicU64,
}

impl FetchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_retried.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_downgrade(&self) {
        self.queries_downgraded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skip(&self) {
        self.parents_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_backoff(&self, duration: Duration) {
        self.total_backoff_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Snapshot the current counters.
    pub fn summary(&self) -> FetchSummary {
        FetchSummary {
            requests_made: self.requests_made.load(Ordering::Relaxed),
            requests_succeeded: self.requests_succeeded.load(Ordering::Relaxed),
            requests_retried: self.requests_retried.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            queries_downgraded: self.queries_downgraded.load(Ordering::Relaxed),
            parents_skipped: self.parents_skipped.load(Ordering::Relaxed),
            total_backoff_secs: self.total_backoff_ms.load(Ordering::Relaxed) as f64 / 1000.0,
        }
    }
}

/// Immutable snapshot of tracker counters for display.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSummary {
    pub requests_made: u64,
    pub requests_succeeded: u64,
    pub requests_retried: u64,
    pub requests_failed: u64,
    pub queries_downgraded: u64,
    pub parents_skipped: u64,
    pub total_backoff_secs: f64,
}

/// Runs `operation` until it succeeds, fails permanently, or exhausts the policy.
///
/// - Transient errors (transport, timeout, 429, 5xx) back off and retry.
/// - A rejected query (400/422) returns [`FetchError::Rejected`] at once so the
///   caller can decide whether to downgrade it.
/// - An undecodable body returns [`FetchError::Decode`], anything else
///   [`FetchError::Api`], both at once.
/// - After `max_attempts` transient failures, returns [`FetchError::Exhausted`].
pub async fn with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    tracker: &FetchTracker,
    endpoint: Endpoint,
    operation: F,
) -> Result<T, FetchError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, netfile_api::Error>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                tracker.record_success();
                return Ok(value);
            }
            Err(err) if err.is_transient() => {
                if attempt >= max_attempts {
                    tracker.record_failure();
                    tracing::error!(
                        "{} request failed after {} attempts: {}",
                        endpoint,
                        attempt,
                        err
                    );
                    return Err(FetchError::Exhausted {
                        endpoint,
                        attempts: attempt,
                        last: err,
                    });
                }
                tracker.record_retry();
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    "{} request failed (attempt {}/{}): {}, retrying in {:.1}s",
                    endpoint,
                    attempt,
                    max_attempts,
                    err,
                    delay.as_secs_f64()
                );
                tracker.record_backoff(delay);
                sleep(delay).await;
            }
            Err(netfile_api::Error::Decode(reason)) => {
                tracker.record_failure();
                return Err(FetchError::Decode { endpoint, reason });
            }
            Err(err) if err.is_rejected_query() => {
                tracker.record_failure();
                return Err(FetchError::Rejected {
                    endpoint,
                    source: err,
                });
            }
            Err(err) => {
                tracker.record_failure();
                return Err(FetchError::Api {
                    endpoint,
                    source: err,
                });
            }
        }
    }
}
