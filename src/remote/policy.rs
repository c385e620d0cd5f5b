use std::future::Future;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use super::RemoteError;

/// Timeout and retry budget applied to every remote call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RequestPolicy {
    /// Upper bound for a single attempt, connection included.
    pub timeout_ms: u64,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_attempts: 3,
            backoff_base_ms: 500,
            backoff_max_ms: 5_000,
        }
    }
}

impl RequestPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay before attempt `failed_attempts + 1`.
    ///
    /// `base * 2^(failed_attempts - 1)`, capped at `backoff_max_ms`.
    pub fn backoff(&self, failed_attempts: u32) -> Duration {
        if failed_attempts == 0 {
            return Duration::ZERO;
        }
        let multiplier = 2u64.saturating_pow(failed_attempts - 1);
        let backoff_ms = self
            .backoff_base_ms
            .saturating_mul(multiplier)
            .min(self.backoff_max_ms);
        Duration::from_millis(backoff_ms)
    }

    /// Run `op` under the per-attempt timeout, retrying transient failures.
    ///
    /// Non-retryable errors and the error of the last attempt are returned
    /// as-is; the caller decides whether the cycle is skipped.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let outcome = match tokio::time::timeout(self.timeout(), op()).await {
                Ok(result) => result,
                Err(_) => Err(RemoteError::Timeout(self.timeout())),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max_attempts && err.is_retryable() => {
                    let delay = self.backoff(attempt);
                    warn!(
                        "{label} failed (attempt {attempt}/{max_attempts}): {err}; retrying in {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn quick_policy(max_attempts: u32) -> RequestPolicy {
        RequestPolicy {
            timeout_ms: 50,
            max_attempts,
            backoff_base_ms: 1,
            backoff_max_ms: 2,
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RequestPolicy {
            backoff_base_ms: 500,
            backoff_max_ms: 3_000,
            ..RequestPolicy::default()
        };

        assert_eq!(policy.backoff(0), Duration::ZERO);
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1_000));
        assert_eq!(policy.backoff(3), Duration::from_millis(2_000));
        assert_eq!(policy.backoff(4), Duration::from_millis(3_000));
        assert_eq!(policy.backoff(40), Duration::from_millis(3_000));
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let calls = Cell::new(0);
        let result = quick_policy(3)
            .run("fetch", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n < 3 {
                        Err(RemoteError::Http {
                            endpoint: "cons".into(),
                            status: 502,
                        })
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn malformed_responses_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<(), _> = quick_policy(5)
            .run("fetch", || {
                calls.set(calls.get() + 1);
                async { Err(RemoteError::Malformed("bad".into())) }
            })
            .await;

        assert!(matches!(result, Err(RemoteError::Malformed(_))));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn stalled_attempts_time_out() {
        let calls = Cell::new(0);
        let result: Result<(), _> = quick_policy(2)
            .run("weather", || {
                calls.set(calls.get() + 1);
                async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                }
            })
            .await;

        assert!(matches!(result, Err(RemoteError::Timeout(_))));
        assert_eq!(calls.get(), 2);
    }
}
