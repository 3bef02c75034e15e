//! Algebrach: the chat bot of the MSU mechmath chat.
//!
//! Serves random keks (quotes and memes) from an Airtable base, takes new
//! suggestions and answers inline queries.
//!
//! # Architecture
//!
//! - `algebrach_error` - Error types
//! - `algebrach_bridge` - Bounded worker pool for blocking calls
//! - `algebrach_cache` - TTL cache with single-flight fill
//! - `algebrach_rate_limit` - Per-user throttle and per-chat reply cooldown
//! - `algebrach_storage` - Airtable client and the cached, retried kek storage
//! - `algebrach_social` - Telegram models, client and update dispatcher
//! - `algebrach_bot` - Handlers, settings, health API and polling server
//!
//! This crate re-exports everything for convenience.

pub use algebrach_bot::*;
pub use algebrach_bridge::*;
pub use algebrach_cache::*;
pub use algebrach_error::*;
pub use algebrach_rate_limit::*;
pub use algebrach_social::*;
pub use algebrach_storage::*;

mod logging;

pub use logging::init_logging;
