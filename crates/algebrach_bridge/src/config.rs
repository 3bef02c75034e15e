//! Bridge configuration.

use derive_getters::Getters;
use std::time::Duration;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Configuration for a [`BlockingBridge`](crate::BlockingBridge).
///
/// # Example
///
/// ```
/// use algebrach_bridge::BridgeConfig;
/// use std::time::Duration;
///
/// let config = BridgeConfig::default()
///     .with_max_workers(4)
///     .with_timeout(Some(Duration::from_secs(30)));
/// assert_eq!(*config.max_workers(), 4);
/// ```
#[derive(Debug, Clone, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct BridgeConfig {
    /// Worker threads in the pool, and the admission limit for in-flight calls
    max_workers: usize,
    /// Timeout applied by `run`; `None` waits forever
    timeout: Option<Duration>,
    /// Prefix for worker thread names
    #[setters(into)]
    thread_name: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_workers: 1,
            timeout: Some(DEFAULT_TIMEOUT),
            thread_name: "bridge-worker".to_string(),
        }
    }
}
