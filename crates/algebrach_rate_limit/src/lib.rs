//! Rate limiting for inbound chat events.
//!
//! Two independent limits guard the command routes:
//! - [`ThrottleSet`] refuses a second command from a user whose previous one
//!   is still running (single-flight per user, nothing is queued)
//! - [`ReplyCooldown`] lets a given warning reply reach a chat at most once per
//!   interval, backed by governor's keyed GCRA limiter

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cooldown;
mod throttle;

pub use cooldown::{DEFAULT_REPLY_INTERVAL, PRUNE_EVERY, ReplyCooldown};
pub use throttle::{ThrottleGuard, ThrottleSet};
