//! Message middlewares wrapping route handlers.

use crate::{EventContext, Handler, Message, Outcome, ReplyTarget};
use algebrach_error::AlgebrachResult;
use algebrach_rate_limit::{ReplyCooldown, ThrottleSet};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Sender id Telegram uses for channel posts auto-forwarded to a linked chat.
pub const AUTO_FORWARD_USER_ID: i64 = 777000;

/// Sender id Telegram uses for admins posting anonymously.
pub const ANONYMOUS_ADMIN_USER_ID: i64 = 1087968824;

/// Reply sent to anonymous senders.
pub const ANONYMOUS_WARNING: &str = "🥷 He кекаю c анонимами";

/// A stage around a matched message handler.
///
/// A middleware either calls `next.run` to continue the chain or returns
/// without doing so to short-circuit it.
#[async_trait]
pub trait MessageMiddleware: Send + Sync {
    /// Process `message`, optionally continuing with `next`.
    async fn call(&self, message: &Message, ctx: &EventContext, next: Next<'_>) -> AlgebrachResult<Outcome>;
}

/// The rest of a middleware chain.
pub struct Next<'a> {
    middlewares: &'a [Arc<dyn MessageMiddleware>],
    handler: &'a dyn Handler<Message>,
}

impl<'a> Next<'a> {
    /// Chain of `middlewares` ending in `handler`.
    pub fn new(middlewares: &'a [Arc<dyn MessageMiddleware>], handler: &'a dyn Handler<Message>) -> Self {
        Self {
            middlewares,
            handler,
        }
    }

    /// Continue with the next middleware, or the handler once none are left.
    pub async fn run(self, message: &Message, ctx: &EventContext) -> AlgebrachResult<Outcome> {
        match self.middlewares.split_first() {
            Some((middleware, rest)) => {
                middleware
                    .call(message, ctx, Next::new(rest, self.handler))
                    .await
            }
            None => {
                self.handler.handle(message, ctx).await?;
                Ok(Outcome::Handled)
            }
        }
    }
}

/// Keeps anonymous senders away from handlers.
///
/// Auto-forwards from a linked channel are dropped silently. Messages from
/// anonymous admins, or sent on behalf of a chat, get a warning at most once
/// per interval per chat and are otherwise dropped.
#[derive(Debug, Default)]
pub struct SkipAnonymous {
    cooldown: ReplyCooldown,
}

impl SkipAnonymous {
    /// Warn each chat at most once per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            cooldown: ReplyCooldown::new(interval),
        }
    }
}

#[async_trait]
impl MessageMiddleware for SkipAnonymous {
    async fn call(&self, message: &Message, ctx: &EventContext, next: Next<'_>) -> AlgebrachResult<Outcome> {
        let sender = message.from_user.as_ref().map(|user| user.id);

        if sender == Some(AUTO_FORWARD_USER_ID) {
            debug!(chat_id = message.chat.id, "Skipping channel auto-forward");
            return Ok(Outcome::Unhandled);
        }

        if sender == Some(ANONYMOUS_ADMIN_USER_ID) || message.sender_chat.is_some() {
            if !self.cooldown.try_acquire(message.chat.id) {
                return Ok(Outcome::Unhandled);
            }
            ctx.api
                .send_text(ReplyTarget::reply_to(message), ANONYMOUS_WARNING)
                .await?;
            return Ok(Outcome::Handled);
        }

        next.run(message, ctx).await
    }
}

/// Refuses a user's command while their previous one is still running.
#[derive(Debug, Clone, Default)]
pub struct ThrottleUsers {
    active: ThrottleSet,
}

impl ThrottleUsers {
    /// Throttle with an empty in-flight set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Users currently in flight.
    pub fn active(&self) -> &ThrottleSet {
        &self.active
    }
}

#[async_trait]
impl MessageMiddleware for ThrottleUsers {
    async fn call(&self, message: &Message, ctx: &EventContext, next: Next<'_>) -> AlgebrachResult<Outcome> {
        let Some(user) = &message.from_user else {
            return next.run(message, ctx).await;
        };

        let Some(_guard) = self.active.try_enter(user.id) else {
            debug!(user_id = user.id, "Dropping command, previous one still running");
            return Ok(Outcome::Unhandled);
        };

        next.run(message, ctx).await
    }
}
