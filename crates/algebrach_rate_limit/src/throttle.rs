//! Single-flight gate keyed by user.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Set of users with a command currently in flight.
///
/// Entering returns a [`ThrottleGuard`]; the user stays in the set until the
/// guard is dropped, which happens on success, error and unwind alike.
///
/// # Example
///
/// ```
/// use algebrach_rate_limit::ThrottleSet;
///
/// let throttle = ThrottleSet::new();
/// let guard = throttle.try_enter(42).expect("first call is admitted");
/// assert!(throttle.try_enter(42).is_none());
/// drop(guard);
/// assert!(throttle.try_enter(42).is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ThrottleSet {
    active: Arc<Mutex<HashSet<i64>>>,
}

impl ThrottleSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `user_id` unless it is already in flight.
    pub fn try_enter(&self, user_id: i64) -> Option<ThrottleGuard> {
        if !self.active.lock().insert(user_id) {
            debug!(user_id, "User already has a command in flight");
            return None;
        }
        Some(ThrottleGuard {
            active: Arc::clone(&self.active),
            user_id,
        })
    }

    /// Whether `user_id` currently holds a guard.
    pub fn contains(&self, user_id: i64) -> bool {
        self.active.lock().contains(&user_id)
    }

    /// Number of users in flight.
    pub fn len(&self) -> usize {
        self.active.lock().len()
    }

    /// Whether nobody is in flight.
    pub fn is_empty(&self) -> bool {
        self.active.lock().is_empty()
    }
}

/// Membership in a [`ThrottleSet`], released on drop.
#[derive(Debug)]
pub struct ThrottleGuard {
    active: Arc<Mutex<HashSet<i64>>>,
    user_id: i64,
}

impl ThrottleGuard {
    /// The admitted user.
    pub fn user_id(&self) -> i64 {
        self.user_id
    }
}

impl Drop for ThrottleGuard {
    fn drop(&mut self) {
        self.active.lock().remove(&self.user_id);
    }
}
