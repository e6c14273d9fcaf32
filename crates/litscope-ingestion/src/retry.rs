//! Rate-limit retry with key rotation and exponential backoff.
//!
//! A rate-limited request is retried against the same target with the next
//! key in the pool. Every key is tried before giving up; once the last key is
//! in use, attempts are capped by `RetryConfig::max_attempts` and the caller
//! gets `ScopusError::CredentialsExhausted` instead of looping forever.

use std::future::Future;
use std::time::Duration;

use litscope_config::RetryConfig;
use tracing::warn;

use crate::error::ScopusError;
use crate::keys::KeyPool;

pub struct KeyRotation {
    pool: KeyPool,
    policy: RetryConfig,
}

impl KeyRotation {
    pub fn new(pool: KeyPool, policy: RetryConfig) -> Self {
        Self { pool, policy }
    }

    pub fn pool(&self) -> &KeyPool {
        &self.pool
    }

    /// Run `op` with the current key until it returns something other than
    /// `RateLimited`, rotating keys and backing off in between.
    pub async fn run<T, F, Fut>(&mut self, target: &str, mut op: F) -> Result<T, ScopusError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, ScopusError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let key = self.pool.current().to_string();
            match op(key).await {
                Err(ScopusError::RateLimited { retry_after_secs }) => {
                    if self.pool.rotate() {
                        warn!(
                            request = target,
                            key_index = self.pool.position(),
                            remaining = self.pool.remaining(),
                            "Rate limited, rotating to next API key"
                        );
                    } else if attempt >= self.policy.max_attempts {
                        return Err(ScopusError::CredentialsExhausted {
                            target: target.to_string(),
                            attempts: attempt,
                        });
                    } else {
                        warn!(request = target, attempt, "Rate limited on the last API key");
                    }

                    let delay = backoff_delay(&self.policy, attempt, retry_after_secs);
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}

/// `base * 2^(attempt-1)` capped at `max_delay`, raised to a server-sent
/// Retry-After when that is still below the cap.
pub fn backoff_delay(policy: &RetryConfig, attempt: u32, retry_after_secs: Option<u64>) -> Duration {
    let max = policy.max_delay();
    let exp = attempt.saturating_sub(1).min(31);
    let delay = policy
        .base_delay()
        .checked_mul(1u32 << exp)
        .unwrap_or(max)
        .min(max);

    match retry_after_secs {
        Some(secs) => delay.max(Duration::from_secs(secs).min(max)),
        None => delay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::cell::RefCell;

    fn policy(max_attempts: u32) -> RetryConfig {
        RetryConfig { max_attempts, base_delay_ms: 1, max_delay_ms: 4 }
    }

    fn rotation(keys: &[&str], max_attempts: u32) -> KeyRotation {
        let keys = keys.iter().map(|k| SecretString::from(k.to_string())).collect();
        KeyRotation::new(KeyPool::new(keys).unwrap(), policy(max_attempts))
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let p = RetryConfig { max_attempts: 10, base_delay_ms: 100, max_delay_ms: 1_000 };
        assert_eq!(backoff_delay(&p, 1, None), Duration::from_millis(100));
        assert_eq!(backoff_delay(&p, 2, None), Duration::from_millis(200));
        assert_eq!(backoff_delay(&p, 3, None), Duration::from_millis(400));
        assert_eq!(backoff_delay(&p, 5, None), Duration::from_millis(1_000));
        assert_eq!(backoff_delay(&p, 64, None), Duration::from_millis(1_000));
    }

    #[test]
    fn test_backoff_honours_retry_after_below_cap() {
        let p = RetryConfig { max_attempts: 10, base_delay_ms: 100, max_delay_ms: 5_000 };
        assert_eq!(backoff_delay(&p, 1, Some(2)), Duration::from_secs(2));
        assert_eq!(backoff_delay(&p, 1, Some(600)), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_success_uses_first_key() {
        let mut rot = rotation(&["k1", "k2"], 3);
        let seen = RefCell::new(Vec::new());
        let out = rot
            .run("2-s2.0-1", |key| {
                seen.borrow_mut().push(key);
                async { Ok::<_, ScopusError>(42) }
            })
            .await
            .unwrap();
        assert_eq!(out, 42);
        assert_eq!(*seen.borrow(), vec!["k1".to_string()]);
    }

    #[tokio::test]
    async fn test_rate_limit_rotates_and_retries_same_target() {
        let mut rot = rotation(&["k1", "k2", "k3"], 5);
        let seen = RefCell::new(Vec::new());
        let out = rot
            .run("2-s2.0-1", |key| {
                seen.borrow_mut().push(key.clone());
                async move {
                    if key == "k3" {
                        Ok("doc")
                    } else {
                        Err(ScopusError::RateLimited { retry_after_secs: None })
                    }
                }
            })
            .await
            .unwrap();
        assert_eq!(out, "doc");
        assert_eq!(*seen.borrow(), vec!["k1", "k2", "k3"]);
        assert_eq!(rot.pool().current(), "k3");
    }

    #[tokio::test]
    async fn test_exhaustion_is_an_error_not_a_loop() {
        let mut rot = rotation(&["k1", "k2"], 4);
        let calls = RefCell::new(0u32);
        let err = rot
            .run("2-s2.0-9", |_key| {
                *calls.borrow_mut() += 1;
                async { Err::<(), _>(ScopusError::RateLimited { retry_after_secs: None }) }
            })
            .await
            .unwrap_err();

        assert_eq!(*calls.borrow(), 4);
        match err {
            ScopusError::CredentialsExhausted { target, attempts } => {
                assert_eq!(target, "2-s2.0-9");
                assert_eq!(attempts, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_every_key_is_tried_before_exhaustion() {
        let mut rot = rotation(&["k1", "k2", "k3", "k4"], 3);
        let seen = RefCell::new(Vec::new());
        let out = rot
            .run("2-s2.0-1", |key| {
                seen.borrow_mut().push(key.clone());
                async move {
                    if key == "k4" {
                        Ok("doc")
                    } else {
                        Err(ScopusError::RateLimited { retry_after_secs: None })
                    }
                }
            })
            .await
            .unwrap();
        assert_eq!(out, "doc");
        assert_eq!(*seen.borrow(), vec!["k1", "k2", "k3", "k4"]);
    }

    #[tokio::test]
    async fn test_more_keys_than_attempts_still_exhausts_on_last_key() {
        let mut rot = rotation(&["k1", "k2", "k3", "k4"], 2);
        let seen = RefCell::new(Vec::new());
        let err = rot
            .run("search", |key| {
                seen.borrow_mut().push(key);
                async { Err::<(), _>(ScopusError::RateLimited { retry_after_secs: None }) }
            })
            .await
            .unwrap_err();
        assert_eq!(*seen.borrow(), vec!["k1", "k2", "k3", "k4"]);
        assert!(matches!(err, ScopusError::CredentialsExhausted { attempts: 4, .. }));
        assert_eq!(rot.pool().remaining(), 0);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let mut rot = rotation(&["k1", "k2"], 5);
        let calls = RefCell::new(0u32);
        let err = rot
            .run("2-s2.0-1", |_key| {
                *calls.borrow_mut() += 1;
                async { Err::<(), _>(ScopusError::Api { status: 500, message: "boom".into() }) }
            })
            .await
            .unwrap_err();
        assert_eq!(*calls.borrow(), 1);
        assert!(matches!(err, ScopusError::Api { status: 500, .. }));
        assert_eq!(rot.pool().current(), "k1");
    }
}
