// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token-bucket rate limiter.
//!
//! Tokens refill continuously at `rate` per second up to `capacity`. A caller
//! that finds the bucket empty sleeps until the next token is due, racing the
//! sleep against a [`CancellationToken`].

use std::time::Duration;

use reelwatch_core::ReelwatchError;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::trace;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Shared token-bucket limiter. Cheap to share behind an `Arc`.
pub struct RateLimiter {
    rate: f64,
    capacity: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Create a limiter allowing `rate_per_sec` steady requests with a burst
    /// of `burst`. A burst of 0 means the same as the rate. The bucket starts full.
    pub fn new(rate_per_sec: u32, burst: u32) -> Self {
        let rate = f64::from(rate_per_sec.max(1));
        let capacity = if burst == 0 { rate } else { f64::from(burst) };
        Self {
            rate,
            capacity,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Steady rate in tokens per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Maximum number of tokens the bucket holds.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Take one token, waiting for it if necessary.
    ///
    /// Fails with [`ReelwatchError::Cancelled`] if `cancel` fires first, or is
    /// already cancelled on entry.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), ReelwatchError> {
        loop {
            if cancel.is_cancelled() {
                return Err(ReelwatchError::Cancelled(
                    "rate limiter acquire cancelled".to_string(),
                ));
            }

            let ready_at = {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.capacity);
                bucket.last_refill = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return Ok(());
                }
                now + Duration::from_secs_f64((1.0 - bucket.tokens) / self.rate)
            };

            trace!(
                wait_ms = ready_at.saturating_duration_since(Instant::now()).as_millis() as u64,
                "rate limited"
            );
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(ReelwatchError::Cancelled(
                        "rate limiter acquire cancelled".to_string(),
                    ));
                }
                _ = sleep_until(ready_at) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn zero_burst_defaults_to_rate() {
        let limiter = RateLimiter::new(7, 0);
        assert_eq!(limiter.capacity(), 7.0);
        let limiter = RateLimiter::new(7, 20);
        assert_eq!(limiter.capacity(), 20.0);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_is_immediate_then_refill_paces() {
        let limiter = RateLimiter::new(2, 2);
        let cancel = CancellationToken::new();
        let start = Instant::now();

        limiter.acquire(&cancel).await.unwrap();
        limiter.acquire(&cancel).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.acquire(&cancel).await.unwrap();
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(500), "waited {waited:?}");
        assert!(waited < Duration::from_millis(600), "waited {waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn shared_limiter_bounds_total_rate() {
        let limiter = Arc::new(RateLimiter::new(5, 5));
        let cancel = CancellationToken::new();
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..15 {
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move { limiter.acquire(&cancel).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // 5 from the burst, 10 more at 5/s.
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_wait() {
        let limiter = RateLimiter::new(1, 1);
        let cancel = CancellationToken::new();
        limiter.acquire(&cancel).await.unwrap();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let err = limiter.acquire(&cancel).await.unwrap_err();
        assert!(matches!(err, ReelwatchError::Cancelled(_)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn already_cancelled_fails_fast() {
        let limiter = RateLimiter::new(10, 10);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(limiter.acquire(&cancel).await.is_err());
    }
}
