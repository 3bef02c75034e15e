//! The algebrach chat bot: command handlers, routing, health API and the polling server.
//!
//! Handlers answer `/start`, `/help`, `/kek`, `/kek_add`, `/kek_push`,
//! `/kek_info` and inline queries. They read and write the kek base through
//! [`algebrach_storage::KekStorage`] and reply through
//! [`algebrach_social::ChatApi`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
pub mod handlers;
mod routes;
mod server;
mod settings;
pub mod texts;

pub use api::{HealthReport, HealthState, check_health, create_router};
pub use routes::{basic_router, build_dispatcher, inline_router, kek_router};
pub use server::{BotServer, POLL_TIMEOUT_SECS};
pub use settings::{DeployEnvironment, Settings};
