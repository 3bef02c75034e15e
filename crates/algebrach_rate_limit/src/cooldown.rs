//! Per-chat cooldown for repeated warning replies.

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// How often a chat may receive the same warning.
pub const DEFAULT_REPLY_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Checks between two sweeps of chats whose interval has elapsed.
pub const PRUNE_EVERY: u64 = 64;

/// Allows one reply per chat per interval.
///
/// Each chat gets a GCRA cell with a burst of one: the first check passes and
/// starts the interval, later checks fail until it has elapsed. Failed checks
/// do not move the window. Every [`PRUNE_EVERY`] checks, chats that are no
/// longer cooling down are forgotten.
///
/// # Example
///
/// ```
/// use algebrach_rate_limit::ReplyCooldown;
/// use std::time::Duration;
///
/// let cooldown = ReplyCooldown::new(Duration::from_secs(3600));
/// assert!(cooldown.try_acquire(-100));
/// assert!(!cooldown.try_acquire(-100));
/// assert!(cooldown.try_acquire(-200));
/// ```
pub struct ReplyCooldown {
    interval: Duration,
    limiter: Option<DefaultKeyedRateLimiter<i64>>,
    checks: AtomicU64,
}

impl ReplyCooldown {
    /// Create a cooldown. A zero interval never holds replies back.
    pub fn new(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval)
            .map(|quota| RateLimiter::keyed(quota.allow_burst(NonZeroU32::MIN)));
        Self {
            interval,
            limiter,
            checks: AtomicU64::new(0),
        }
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Claim the reply slot for `chat_id`; false while the chat is cooling down.
    pub fn try_acquire(&self, chat_id: i64) -> bool {
        let Some(limiter) = &self.limiter else {
            return true;
        };
        let allowed = limiter.check_key(&chat_id).is_ok();
        if !allowed {
            debug!(chat_id, "Reply suppressed by cooldown");
        }
        if (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % PRUNE_EVERY == 0 {
            self.prune();
        }
        allowed
    }

    /// Number of chats currently tracked.
    pub fn tracked_chats(&self) -> usize {
        self.limiter.as_ref().map_or(0, |limiter| limiter.len())
    }

    /// Forget chats whose interval has fully elapsed.
    pub fn prune(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.retain_recent();
            debug!(tracked = limiter.len(), "Pruned reply cooldowns");
        }
    }
}

impl Default for ReplyCooldown {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY_INTERVAL)
    }
}

impl std::fmt::Debug for ReplyCooldown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyCooldown")
            .field("interval", &self.interval)
            .finish()
    }
}
