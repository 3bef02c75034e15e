//! `/kek_add` and `/kek_push`.

use super::{author_of, new_kek, send_record, actor};
use crate::texts;
use algebrach_error::AlgebrachResult;
use algebrach_social::{EventContext, Handler, Message, ReplyTarget};
use algebrach_storage::KekStorage;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

/// Sends the replied-to message to the suggestions table.
pub struct KekAdd {
    storage: Arc<KekStorage>,
}

impl KekAdd {
    /// Handler writing to `storage`.
    pub fn new(storage: Arc<KekStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Handler<Message> for KekAdd {
    #[instrument(skip_all, fields(chat_id = message.chat.id, message_id = message.message_id))]
    async fn handle(&self, message: &Message, ctx: &EventContext) -> AlgebrachResult<()> {
        let target = ReplyTarget::reply_to(message);
        let (Some(reply), Some(suggestor)) = (message.reply_to_message.as_deref(), &message.from_user) else {
            ctx.api.send_text(target, texts::KEK_ADD_NO_REPLY).await?;
            return Ok(());
        };
        let Some(author) = author_of(reply) else {
            ctx.api.send_text(target, texts::KEK_ADD_NO_REPLY).await?;
            return Ok(());
        };

        let kek = new_kek(ctx.api.as_ref(), reply).await?;
        let record = self
            .storage
            .create_suggestion(&author, &actor(suggestor), &kek)
            .await?;
        info!(record_id = %record.id, author = author.telegram_id, "Kek suggested");

        let link = match reply.url() {
            Some(url) => format!("<a href=\"{}\">Кек</a>", url),
            None => "Кек".to_string(),
        };
        ctx.api.send_text(target, &texts::kek_suggested(&link)).await?;
        Ok(())
    }
}

/// Writes the replied-to message straight into the kek list and echoes it.
pub struct KekPush {
    storage: Arc<KekStorage>,
}

impl KekPush {
    /// Handler writing to `storage`.
    pub fn new(storage: Arc<KekStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Handler<Message> for KekPush {
    #[instrument(skip_all, fields(chat_id = message.chat.id, message_id = message.message_id))]
    async fn handle(&self, message: &Message, ctx: &EventContext) -> AlgebrachResult<()> {
        let target = ReplyTarget::reply_to(message);
        let Some(reply) = message.reply_to_message.as_deref() else {
            ctx.api.send_text(target, texts::KEK_ADD_NO_REPLY).await?;
            return Ok(());
        };
        let Some(author) = author_of(reply) else {
            ctx.api.send_text(target, texts::KEK_ADD_NO_REPLY).await?;
            return Ok(());
        };

        let kek = new_kek(ctx.api.as_ref(), reply).await?;
        let record = self.storage.create_direct_entry(&author, &kek).await?;
        info!(record_id = %record.id, author = author.telegram_id, "Kek pushed");

        send_record(ctx.api.as_ref(), target, &record).await?;
        Ok(())
    }
}

/// `/kek_add` in the main chat without a reply.
#[derive(Debug, Default)]
pub struct KekAddNoReply;

#[async_trait]
impl Handler<Message> for KekAddNoReply {
    async fn handle(&self, message: &Message, ctx: &EventContext) -> AlgebrachResult<()> {
        ctx.api
            .send_text(ReplyTarget::reply_to(message), texts::KEK_ADD_NO_REPLY)
            .await?;
        Ok(())
    }
}

/// `/kek_add` outside the main chat.
#[derive(Debug, Default)]
pub struct KekAddElsewhere;

#[async_trait]
impl Handler<Message> for KekAddElsewhere {
    async fn handle(&self, message: &Message, ctx: &EventContext) -> AlgebrachResult<()> {
        ctx.api
            .send_text(ReplyTarget::reply_to(message), texts::KEK_ADD_ELSEWHERE)
            .await?;
        Ok(())
    }
}
