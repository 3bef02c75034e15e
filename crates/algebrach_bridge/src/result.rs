//! Outcome of a bridged call.

/// What happened to a call submitted through the bridge.
///
/// A call either produced a value, ran out of time, or could not be run
/// because the worker pool stayed unusable after one rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkResult<T> {
    /// The function finished within its timeout.
    Value(T),
    /// The caller stopped waiting; the function may still be running.
    TimedOut,
    /// The pool broke, was rebuilt, and broke again.
    PoolBroken,
}

impl<T> WorkResult<T> {
    /// Returns true for [`WorkResult::TimedOut`].
    pub fn is_timed_out(&self) -> bool {
        matches!(self, WorkResult::TimedOut)
    }

    /// Returns true for [`WorkResult::PoolBroken`].
    pub fn is_pool_broken(&self) -> bool {
        matches!(self, WorkResult::PoolBroken)
    }

    /// The produced value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            WorkResult::Value(value) => Some(value),
            WorkResult::TimedOut | WorkResult::PoolBroken => None,
        }
    }

    /// Map the produced value, keeping the failure variants.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WorkResult<U> {
        match self {
            WorkResult::Value(value) => WorkResult::Value(f(value)),
            WorkResult::TimedOut => WorkResult::TimedOut,
            WorkResult::PoolBroken => WorkResult::PoolBroken,
        }
    }
}
