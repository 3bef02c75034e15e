//! Read-through caching with TTL support.
//!
//! This crate caches the results of expensive record store reads so repeated
//! commands within the TTL never reach the remote store.

#![warn(missing_docs)]

mod cache;

pub use cache::{CacheConfig, CacheConfigBuilder, CacheEntry, TtlCache};
