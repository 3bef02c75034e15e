//! Update dispatcher: timing, context extraction, routing and the error boundary.

use crate::{ChatApi, EventContext, Outcome, ReplyTarget, Router, Update, UpdateKind, UpdateSummary};
use algebrach_error::{AlgebrachError, AlgebrachResult, StorageErrorKind, TelegramError};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Reply sent when the record store is slow or refused the request.
pub const APOLOGY_REPLY: &str = "⏱ Service is temporarily slow. Please try again in a moment.";

/// Reply sent for any other handler failure.
pub const FAILURE_REPLY: &str = "❌ An unexpected error occurred. Please try again later.";

/// Feeds updates through routers in registration order.
///
/// Every update is timed and summarized in one log line. Handler errors
/// and panics never escape [`Dispatcher::feed_update`]; they are logged and
/// answered with a short reply in the chat the update came from.
pub struct Dispatcher {
    api: Arc<dyn ChatApi>,
    routers: Vec<Router>,
    bot_username: Option<String>,
    events_chat_id: Option<i64>,
}

impl Dispatcher {
    /// Dispatcher replying through `api`.
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            routers: Vec::new(),
            bot_username: None,
            events_chat_id: None,
        }
    }

    /// Append a router. Earlier routers get the first look at every update.
    pub fn include_router(mut self, router: Router) -> Self {
        self.routers.push(router);
        self
    }

    /// Only accept `/command@mention` addressed to this username.
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Chat receiving a note about every handler failure.
    pub fn with_events_chat_id(mut self, chat_id: Option<i64>) -> Self {
        self.events_chat_id = chat_id;
        self
    }

    /// Reply sink shared with handlers.
    pub fn api(&self) -> &Arc<dyn ChatApi> {
        &self.api
    }

    /// Registered routers, in dispatch order.
    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    /// Process one update end to end.
    pub async fn feed_update(&self, update: &Update) -> Outcome {
        let started = Instant::now();
        let outcome = self.process(update).await;
        let summary = UpdateSummary::of(update).log_line(started.elapsed().as_millis());

        match outcome {
            Outcome::Handled => info!(
                update_id = update.update_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                %summary,
                "Update handled"
            ),
            Outcome::Unhandled => debug!(
                update_id = update.update_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                %summary,
                "Update unhandled"
            ),
        }
        outcome
    }

    async fn process(&self, update: &Update) -> Outcome {
        let ctx = EventContext::extract(update, self.api.clone());

        match AssertUnwindSafe(self.route(update, &ctx)).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!(error = %e, kind = update.kind().name(), "Handler failed");
                self.report_failure(update, &ctx, failure_reply(&e), &e.to_string())
                    .await;
                Outcome::Handled
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(panic = %message, kind = update.kind().name(), "Handler panicked");
                self.report_failure(update, &ctx, FAILURE_REPLY, &format!("panic: {}", message))
                    .await;
                Outcome::Handled
            }
        }
    }

    async fn route(&self, update: &Update, ctx: &EventContext) -> AlgebrachResult<Outcome> {
        let bot_username = self.bot_username.as_deref();
        for router in &self.routers {
            let outcome = match update.kind() {
                UpdateKind::Message(message) => router.dispatch_message(message, ctx, bot_username).await?,
                UpdateKind::InlineQuery(query) => router.dispatch_inline_query(query, ctx).await?,
                UpdateKind::ChosenInlineResult(chosen) => {
                    router.dispatch_chosen_inline_result(chosen, ctx).await?
                }
                _ => Outcome::Unhandled,
            };
            if outcome == Outcome::Handled {
                return Ok(outcome);
            }
        }
        Ok(Outcome::Unhandled)
    }

    #[instrument(skip_all, fields(update_id = update.update_id))]
    async fn report_failure(&self, update: &Update, ctx: &EventContext, reply: &str, detail: &str) {
        let target = match update.kind() {
            UpdateKind::Message(message) => Some(ReplyTarget::reply_to(message)),
            _ => ctx.chat.as_ref().map(|chat| ReplyTarget::chat(chat.id)),
        };
        if let Some(target) = target
            && let Err(e) = self.api.send_text(target, reply).await
        {
            warn!(error = %e, "Failed to send failure reply");
        }

        if let Some(events_chat_id) = self.events_chat_id {
            let note = format!(
                "<b>Handler failed</b>\n{}\n\n<code>{}</code>",
                crate::escape_html(&UpdateSummary::of(update).log_line(0)),
                crate::escape_html(detail)
            );
            if let Err(e) = self.notify(events_chat_id, &note).await {
                warn!(error = %e, "Failed to notify events chat");
            }
        }
    }

    async fn notify(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.api.send_text(ReplyTarget::chat(chat_id), text).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routers", &self.routers.iter().map(Router::name).collect::<Vec<_>>())
            .field("bot_username", &self.bot_username)
            .field("events_chat_id", &self.events_chat_id)
            .finish_non_exhaustive()
    }
}

/// User-visible reply for a handler error.
pub fn failure_reply(err: &AlgebrachError) -> &'static str {
    match err.as_storage().map(|e| e.kind()) {
        Some(StorageErrorKind::Timeout | StorageErrorKind::RemoteRejected(_)) => APOLOGY_REPLY,
        _ => FAILURE_REPLY,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
