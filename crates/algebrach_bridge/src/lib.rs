//! Blocking-call bridge for async handlers.
//!
//! The record store client is synchronous. Calling it straight from a tokio
//! task would park a runtime worker for the whole HTTP round trip, so every
//! call goes through a [`BlockingBridge`]:
//!
//! - an admission semaphore caps in-flight calls at `max_workers`
//! - calls run on a dedicated, lazily created [`ExecutorPool`]
//! - each call races a timeout and reports [`WorkResult::TimedOut`] instead of erroring
//! - a pool whose worker panicked is discarded, rebuilt, and the call retried once
//!
//! # Example
//!
//! ```rust,no_run
//! use algebrach_bridge::{BlockingBridge, BridgeConfig, WorkResult};
//!
//! # async fn demo() {
//! let bridge = BlockingBridge::new(BridgeConfig::default());
//! match bridge.run(|| 2 + 2).await {
//!     WorkResult::Value(sum) => assert_eq!(sum, 4),
//!     WorkResult::TimedOut => eprintln!("too slow"),
//!     WorkResult::PoolBroken => eprintln!("pool is gone"),
//! }
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bridge;
mod config;
mod pool;
mod result;

pub use bridge::BlockingBridge;
pub use config::{BridgeConfig, DEFAULT_TIMEOUT};
pub use pool::ExecutorPool;
pub use result::WorkResult;
