//! Sliding-window rate limiter for outbound platform API calls
//!
//! The platform enforces a per-token request budget per second. One limiter
//! instance is shared by every caller holding the same access token; it
//! admits bursts up to the configured size but never more than that many
//! calls within any trailing one-second window.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(1);

/// Admits at most `per_second` invocations per trailing one-second window
///
/// Keeps the timestamps of the last `per_second` admissions in a bounded
/// FIFO. A new caller is admitted immediately while the window has room;
/// once full, the caller sleeps for the remainder of the second measured
/// from the oldest recorded admission.
pub struct RateLimiter {
    timestamps: Mutex<VecDeque<Instant>>,
    per_second: usize,
}

impl RateLimiter {
    /// Creates a limiter admitting `per_second` calls per trailing second
    ///
    /// `per_second` must be at least 1; config validation enforces this
    /// before a limiter is ever built.
    pub fn new(per_second: usize) -> Self {
        Self {
            timestamps: Mutex::new(VecDeque::with_capacity(per_second)),
            per_second,
        }
    }

    /// Waits for admission, records it, then runs `call`
    ///
    /// The internal lock is only held to inspect and update the window,
    /// never across a sleep or the call itself, so concurrent callers
    /// sharing one limiter cannot deadlock each other.
    pub async fn execute<F, Fut, T>(&self, call: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.admit().await;
        call().await
    }

    async fn admit(&self) {
        loop {
            let wait = {
                let mut timestamps = self.timestamps.lock().unwrap();
                let now = Instant::now();
                if timestamps.len() < self.per_second {
                    timestamps.push_back(now);
                    None
                } else {
                    // window is full; the oldest admission bounds the next slot
                    let oldest = timestamps[0];
                    let elapsed = now.duration_since(oldest);
                    if elapsed >= WINDOW {
                        timestamps.pop_front();
                        timestamps.push_back(now);
                        None
                    } else {
                        Some(WINDOW - elapsed)
                    }
                }
            };

            match wait {
                None => return,
                Some(delay) => {
                    tracing::trace!("rate limiter window full, waiting {:?}", delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
