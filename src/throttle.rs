//! Client-side sliding-window request throttling.
//!
//! Both upstream APIs (the repository host and the text-generation service)
//! enforce per-window quotas. [`SlidingWindowLimiter`] keeps callers under a
//! configured budget by recording admission timestamps and suspending tasks
//! that would exceed the budget until the oldest admission leaves the window.
//! This is best-effort throttling only; the upstream services remain the
//! authority on their own limits.

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Length of the trailing admission window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Admits at most `max_requests` callers per trailing window.
///
/// Each limiter owns its own timestamp sequence and lock, so independent
/// upstreams get independent budgets: exhausting one limiter never delays
/// callers of another. Construction takes a [`NonZeroU32`] budget, which
/// makes the degenerate always-blocking configuration unrepresentable.
///
/// # Example
///
/// ```
/// use std::num::NonZeroU32;
/// use appraise::throttle::SlidingWindowLimiter;
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let limiter = SlidingWindowLimiter::per_minute(NonZeroU32::MIN);
/// limiter.acquire().await;
/// # });
/// ```
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    admissions: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    /// Creates a limiter admitting `max_requests` per `window`.
    #[must_use]
    pub const fn new(max_requests: NonZeroU32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.get() as usize,
            window,
            admissions: Mutex::const_new(VecDeque::new()),
        }
    }

    /// Creates a limiter admitting `max_requests` per trailing minute.
    #[must_use]
    pub const fn per_minute(max_requests: NonZeroU32) -> Self {
        Self::new(max_requests, WINDOW)
    }

    /// Suspends the calling task until a slot is free, then records the
    /// admission. On return the caller is authorised to issue exactly one
    /// request.
    ///
    /// The window state is read-modified-written under the lock, but the
    /// lock is released before sleeping so waiting callers cannot starve
    /// each other. After the sleep the window is re-checked from scratch,
    /// because concurrent acquirers may have taken the freed slot first.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut admissions = self.admissions.lock().await;
                let now = Instant::now();
                Self::evict_expired(&mut admissions, now, self.window);

                if admissions.len() < self.max_requests {
                    admissions.push_back(now);
                    return;
                }

                // Saturating arithmetic clamps the wait to zero if the
                // oldest admission expires between the eviction and here.
                admissions.front().map_or(Duration::ZERO, |oldest| {
                    self.window.saturating_sub(now.duration_since(*oldest))
                })
            };

            tracing::debug!(?wait, "window full, waiting for a slot");
            tokio::time::sleep(wait).await;
        }
    }

    /// Drops admissions older than the window. The sequence is time-ordered
    /// by construction, so expired entries are always at the front.
    fn evict_expired(admissions: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(oldest) = admissions.front() {
            if now.duration_since(*oldest) >= window {
                admissions.pop_front();
            } else {
                break;
            }
        }
    }
}
