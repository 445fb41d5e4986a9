//! Bounded retry with exponential backoff

use crate::error::{Result, WorkerError};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry policy for calls to external services.
///
/// The total budget is deliberately small so one stalled dependency cannot
/// unboundedly delay the consumer's ability to acknowledge other items.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts beyond the first call
    pub max_retries: u32,
    /// Base delay; doubles per retry
    pub base_delay: Duration,
    /// Ceiling on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    /// Delay before retry `attempt` (1-based), with jitter
    fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(1u32 << attempt.min(16))
            .min(self.max_delay);
        let jitter = rand::thread_rng().gen_range(0.5..1.5);
        exp.mul_f64(jitter).min(self.max_delay)
    }
}

/// Run `op` with bounded retries on transient failures.
///
/// Hard failures (schema violations, non-retryable statuses) return
/// immediately; transient ones are retried until the budget is exhausted and
/// then reclassified as hard so callers see a definite outcome.
pub async fn with_retries<T, F, Fut>(name: &str, policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                warn!(call = name, attempt, ?delay, error = %err, "transient failure, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(WorkerError::Transient(msg)) => {
                return Err(WorkerError::Hard(format!(
                    "{name}: retries exhausted after {attempt} retries: {msg}"
                )));
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let result = with_retries("test", &policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(WorkerError::Transient("refused".to_string()))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_budget_becomes_hard() {
        let policy = RetryPolicy::new(1, Duration::from_millis(1));
        let result: Result<()> = with_retries("test", &policy, || async {
            Err(WorkerError::Transient("timeout".to_string()))
        })
        .await;
        assert!(matches!(result, Err(WorkerError::Hard(_))));
    }

    #[tokio::test]
    async fn test_hard_failure_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::from_millis(1));
        let result: Result<()> = with_retries("test", &policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(WorkerError::Hard("bad schema".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
