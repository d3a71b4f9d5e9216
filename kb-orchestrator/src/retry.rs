//! Bounded exponential backoff over classified outcomes.
//!
//! An outcome is retried when it is retry-eligible by default and its kind is
//! not listed in [`RetryPolicy::non_retryable`]. The delay before attempt
//! `n + 1` is `initial_interval * backoff_coefficient^(n-1)`, capped at
//! `maximum_interval`, so the schedule never decreases.

use kb_config::RetryConfig;
use kb_provider::{OperationOutcome, OutcomeKind};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub backoff_coefficient: f64,
    pub maximum_interval: Duration,
    /// Total attempts including the first one.
    pub maximum_attempts: u32,
    pub non_retryable: Vec<OutcomeKind>,
    /// Upper bound on a single remote call.
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            backoff_coefficient: 2.0,
            maximum_interval: Duration::from_secs(10),
            maximum_attempts: 3,
            non_retryable: Vec::new(),
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            initial_interval: Duration::from_millis(config.initial_interval_ms),
            backoff_coefficient: config.backoff_coefficient,
            maximum_interval: Duration::from_millis(config.maximum_interval_ms),
            maximum_attempts: config.maximum_attempts,
            non_retryable: Vec::new(),
            call_timeout: Duration::from_millis(config.call_timeout_ms),
        }
    }
}

/// Final outcome of a retried call and how many attempts it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempted {
    pub outcome: OperationOutcome,
    pub attempts: u32,
}

/// The token fired before an attempt started or while waiting to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl RetryPolicy {
    pub fn with_non_retryable(mut self, kinds: impl IntoIterator<Item = OutcomeKind>) -> Self {
        self.non_retryable.extend(kinds);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn should_retry(&self, outcome: &OperationOutcome) -> bool {
        outcome.is_retry_eligible() && !self.non_retryable.contains(&outcome.kind())
    }

    fn attempts_allowed(&self) -> u32 {
        self.maximum_attempts.max(1)
    }

    /// Delay after the `attempt`-th failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let scaled = self.initial_interval.as_secs_f64() * self.backoff_coefficient.powi(exponent);
        let capped = scaled.min(self.maximum_interval.as_secs_f64());
        Duration::try_from_secs_f64(capped).unwrap_or(self.maximum_interval)
    }

    /// Every delay a call that keeps failing would sleep through.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.attempts_allowed()).map(|a| self.backoff(a)).collect()
    }

    /// Run `call` until it settles, the attempts run out or `token` fires.
    ///
    /// Each attempt is bounded by `call_timeout`; a timed out attempt counts as
    /// a `NetworkFailure`. Cancellation never abandons an attempt in flight. The
    /// token is checked before each attempt and during backoff sleeps, so a
    /// call that settles after cancellation still reports its outcome.
    pub async fn execute<F, Fut>(
        &self,
        token: &CancellationToken,
        mut call: F,
    ) -> Result<Attempted, Cancelled>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = OperationOutcome>,
    {
        let max_attempts = self.attempts_allowed();
        let mut attempt: u32 = 0;

        loop {
            if token.is_cancelled() {
                debug!(attempt, "cancelled before attempt");
                return Err(Cancelled);
            }
            attempt += 1;

            let outcome = tokio::time::timeout(self.call_timeout, call())
                .await
                .unwrap_or_else(|_| {
                    OperationOutcome::NetworkFailure(format!(
                        "timed out after {}ms",
                        self.call_timeout.as_millis()
                    ))
                });

            if !self.should_retry(&outcome) {
                debug!(attempt, outcome = %outcome, "call settled");
                return Ok(Attempted {
                    outcome,
                    attempts: attempt,
                });
            }
            if attempt >= max_attempts {
                warn!(attempt, outcome = %outcome, "retry attempts exhausted");
                return Ok(Attempted {
                    outcome,
                    attempts: attempt,
                });
            }

            let delay = self.backoff(attempt);
            warn!(
                attempt,
                max_attempts,
                backoff_ms = delay.as_millis() as u64,
                outcome = %outcome,
                "retrying after backoff"
            );

            tokio::select! {
                biased;
                () = token.cancelled() => return Err(Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn network() -> OperationOutcome {
        OperationOutcome::NetworkFailure("connection refused".into())
    }

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.schedule(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[test]
    fn test_backoff_is_capped_and_non_decreasing() {
        let policy = RetryPolicy {
            initial_interval: Duration::from_secs(3),
            backoff_coefficient: 3.0,
            maximum_attempts: 6,
            ..RetryPolicy::default()
        };
        let schedule = policy.schedule();
        assert_eq!(schedule.len(), 5);
        assert_eq!(schedule[0], Duration::from_secs(3));
        assert_eq!(schedule[1], Duration::from_secs(9));
        assert!(schedule[2..].iter().all(|d| *d == Duration::from_secs(10)));
        assert!(schedule.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_backoff_survives_huge_exponents() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_should_retry_honours_non_retryable() {
        let policy = RetryPolicy::default();
        let unexpected = OperationOutcome::UnexpectedFailure("HTTP 500, boom".into());
        assert!(policy.should_retry(&network()));
        assert!(policy.should_retry(&unexpected));
        assert!(!policy.should_retry(&OperationOutcome::AuthFailure("x".into())));
        assert!(!policy.should_retry(&OperationOutcome::NotFound("x".into())));
        assert!(!policy.should_retry(&OperationOutcome::AlreadyDone));

        let strict = policy.with_non_retryable([OutcomeKind::UnexpectedFailure]);
        assert!(!strict.should_retry(&unexpected));
        assert!(strict.should_retry(&network()));
    }

    #[test]
    fn test_from_config() {
        let policy = RetryPolicy::from(&RetryConfig::default());
        assert_eq!(policy, RetryPolicy::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_stops_after_max_attempts_with_growing_delays() {
        let policy = RetryPolicy::default();
        let token = CancellationToken::new();
        let started = Instant::now();
        let seen: Arc<Mutex<Vec<Duration>>> = Arc::default();

        let result = policy
            .execute(&token, || {
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push(started.elapsed());
                    network()
                }
            })
            .await
            .unwrap();

        assert_eq!(result.attempts, 3);
        assert_eq!(result.outcome, network());
        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![Duration::ZERO, Duration::from_secs(1), Duration::from_secs(3)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_returns_first_settled_outcome() {
        let policy = RetryPolicy::default();
        let token = CancellationToken::new();
        let calls = AtomicU32::new(0);

        let result = policy
            .execute(&token, || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        network()
                    } else {
                        OperationOutcome::Success
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result.attempts, 2);
        assert!(result.outcome.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_does_not_retry_terminal_outcomes() {
        let policy = RetryPolicy::default();
        let token = CancellationToken::new();
        let calls = AtomicU32::new(0);

        let result = policy
            .execute(&token, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { OperationOutcome::NotFound("HTTP 404, gone".into()) }
            })
            .await
            .unwrap();

        assert_eq!(result.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_times_out_slow_calls() {
        let policy = RetryPolicy {
            maximum_attempts: 1,
            ..RetryPolicy::default()
        }
        .with_call_timeout(Duration::from_millis(50));
        let token = CancellationToken::new();

        let result = policy
            .execute(&token, || async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                OperationOutcome::Success
            })
            .await
            .unwrap();

        assert_eq!(result.outcome.kind(), OutcomeKind::NetworkFailure);
    }

    #[tokio::test]
    async fn test_execute_refuses_when_already_cancelled() {
        let policy = RetryPolicy::default();
        let token = CancellationToken::new();
        token.cancel();
        let calls = AtomicU32::new(0);

        let result = policy
            .execute(&token, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { OperationOutcome::Success }
            })
            .await;

        assert_eq!(result, Err(Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_cancelled_during_backoff() {
        let policy = RetryPolicy::default();
        let token = CancellationToken::new();
        let calls = Arc::new(AtomicU32::new(0));

        let handle = {
            let token = token.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                policy
                    .execute(&token, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        async { network() }
                    })
                    .await
            })
        };

        // First attempt fails at t=0; the retry is due at t=1s.
        tokio::time::sleep(Duration::from_millis(500)).await;
        token.cancel();

        assert_eq!(handle.await.unwrap(), Err(Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_lets_in_flight_call_finish() {
        let policy = RetryPolicy::default();
        let token = CancellationToken::new();
        let finished = Arc::new(AtomicU32::new(0));

        let handle = {
            let token = token.clone();
            let finished = finished.clone();
            tokio::spawn(async move {
                policy
                    .execute(&token, || {
                        let finished = finished.clone();
                        async move {
                            tokio::time::sleep(Duration::from_secs(2)).await;
                            finished.fetch_add(1, Ordering::SeqCst);
                            OperationOutcome::Success
                        }
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();
        let result = handle.await.unwrap().unwrap();

        assert!(result.outcome.is_success());
        assert_eq!(result.attempts, 1);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_cancelled_mid_call_skips_retry() {
        let policy = RetryPolicy::default();
        let token = CancellationToken::new();
        let canceller = token.clone();
        let calls = AtomicU32::new(0);

        let result = policy
            .execute(&token, || {
                calls.fetch_add(1, Ordering::SeqCst);
                let canceller = canceller.clone();
                async move {
                    canceller.cancel();
                    network()
                }
            })
            .await;

        assert_eq!(result, Err(Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
