//! Token-bucket rate limiter.
//!
//! A background task refills exactly one token per refill period, capped
//! at the bucket's capacity. `allow` is non-blocking; `wait` polls at a
//! tenth of the refill period rather than spinning.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

/// Token bucket gating how many operations may start per unit time.
#[derive(Debug)]
pub struct RateLimiter {
    inner: Arc<Bucket>,
    refill_period: Duration,
}

#[derive(Debug)]
struct Bucket {
    tokens: Mutex<u32>,
    max_tokens: u32,
}

impl RateLimiter {
    /// Create a limiter with `max_tokens` capacity (initially full) and
    /// spawn its refill task. Must be called within a tokio runtime.
    pub fn new(max_tokens: u32, refill_period: Duration) -> Self {
        let inner = Arc::new(Bucket {
            tokens: Mutex::new(max_tokens),
            max_tokens,
        });

        let bucket: Weak<Bucket> = Arc::downgrade(&inner);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(refill_period);
            interval.tick().await; // first tick fires immediately
            loop {
                interval.tick().await;
                match bucket.upgrade() {
                    Some(bucket) => bucket.refill_one(),
                    None => break,
                }
            }
        });

        Self {
            inner,
            refill_period,
        }
    }

    /// Try to consume a token. Non-blocking.
    pub fn allow(&self) -> bool {
        let mut tokens = self.inner.tokens.lock().unwrap_or_else(|e| e.into_inner());
        if *tokens > 0 {
            *tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Wait until a token is available and consume it.
    ///
    /// Polls at `refill_period / 10` so a blocked caller does not spin.
    pub async fn wait(&self) {
        let poll = (self.refill_period / 10).max(Duration::from_millis(1));
        while !self.allow() {
            tokio::time::sleep(poll).await;
        }
    }

    /// Current token count.
    pub fn available(&self) -> u32 {
        *self.inner.tokens.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Bucket {
    fn refill_one(&self) {
        let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        if *tokens < self.max_tokens {
            *tokens += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burst_is_capped_at_capacity() {
        let limiter = RateLimiter::new(2, Duration::from_secs(1));

        assert!(limiter.allow());
        assert!(limiter.allow());
        assert!(!limiter.allow());
    }

    #[tokio::test]
    async fn refill_restores_one_token_per_period() {
        let limiter = RateLimiter::new(2, Duration::from_millis(50));

        assert!(limiter.allow());
        assert!(limiter.allow());
        assert!(!limiter.allow());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(limiter.allow());
    }

    #[tokio::test]
    async fn refill_never_exceeds_capacity() {
        let limiter = RateLimiter::new(2, Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(limiter.available(), 2);
    }

    #[tokio::test]
    async fn wait_blocks_until_a_token_appears() {
        let limiter = RateLimiter::new(1, Duration::from_millis(30));
        assert!(limiter.allow());

        let started = std::time::Instant::now();
        limiter.wait().await;
        assert!(started.elapsed() >= Duration::from_millis(3));
    }
}
