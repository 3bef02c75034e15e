//! Telegram integration for algebrach.
//!
//! This crate provides the chat platform side of the bot:
//! - Serde models of the Bot API update envelope
//! - The [`ChatApi`] reply sink and its HTTP implementation [`TelegramClient`]
//! - Attachment dispatch with a URL fallback for stale file ids
//! - The update dispatcher with its middleware chain and first-match routing
//!
//! # Example
//!
//! ```no_run
//! use algebrach_social::{Dispatcher, Router, TelegramClient};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let api = Arc::new(TelegramClient::new("123:token"));
//! let dispatcher = Dispatcher::new(api).include_router(Router::new("basic"));
//! # let _ = dispatcher;
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod dispatch;
mod telegram;

pub use dispatch::*;
pub use telegram::*;
