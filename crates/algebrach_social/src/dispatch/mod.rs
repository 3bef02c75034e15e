//! Update Dispatcher Middleware Chain.
//!
//! Stages, outermost first:
//! 1. [`Dispatcher::feed_update`] times the update and logs a summary line
//! 2. [`EventContext::extract`] resolves user, chat and topic
//! 3. [`SkipAnonymous`] drops auto-forwards and warns anonymous senders
//! 4. [`ThrottleUsers`] refuses overlapping commands from one user
//! 5. the [`Handler`] selected by the first matching [`Route`]

mod context;
mod dispatcher;
mod handler;
mod middleware;
mod router;

pub use context::{EventContext, Outcome};
pub use dispatcher::{APOLOGY_REPLY, Dispatcher, FAILURE_REPLY, failure_reply};
pub use handler::Handler;
pub use middleware::{
    ANONYMOUS_ADMIN_USER_ID, ANONYMOUS_WARNING, AUTO_FORWARD_USER_ID, MessageMiddleware, Next,
    SkipAnonymous, ThrottleUsers,
};
pub use router::{Filter, QueryFilter, Route, Router, parse_command};
