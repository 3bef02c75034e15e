//! `/kek`: a random kek from the base.

use crate::texts;
use algebrach_error::{AlgebrachResult, TelegramResult};
use algebrach_social::{Attachment, ChatApi, EventContext, Handler, Message, ReplyTarget, reply_with_attachment};
use algebrach_storage::{KekRecord, KekStorage};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Reply with `record`, its attachment sent by file id with the stored copy as fallback.
pub async fn send_record(api: &dyn ChatApi, target: ReplyTarget, record: &KekRecord) -> TelegramResult<Message> {
    let fields = &record.fields;
    let attachment = Attachment::from_stored(
        fields.attachment_type.as_deref(),
        fields.attachment_file_id.as_deref(),
    );
    reply_with_attachment(
        api,
        target,
        fields.text.as_deref(),
        &attachment,
        fields.attachment_url(),
    )
    .await
}

/// Sends a random kek.
///
/// With `refresh_file_ids` set, a file id Telegram hands back that differs
/// from the stored one is written to the base; failures there are only logged.
pub struct Kek {
    storage: Arc<KekStorage>,
    refresh_file_ids: bool,
}

impl Kek {
    /// Handler reading from `storage`.
    pub fn new(storage: Arc<KekStorage>, refresh_file_ids: bool) -> Self {
        Self {
            storage,
            refresh_file_ids,
        }
    }

    /// Send a random kek as a reply to `message`.
    #[instrument(skip_all, fields(chat_id = message.chat.id, message_id = message.message_id))]
    pub async fn reply(&self, message: &Message, api: &dyn ChatApi) -> AlgebrachResult<()> {
        let records = self.storage.list_records().await?;
        let target = ReplyTarget::reply_to(message);

        let picked = records.choose(&mut rand::thread_rng());
        let Some(record) = picked else {
            api.send_text(target, texts::NO_KEKS).await?;
            return Ok(());
        };
        debug!(record_id = %record.id, total = records.len(), "Picked kek");

        let sent = send_record(api, target, record).await?;
        if self.refresh_file_ids {
            self.refresh_file_id(record, &sent).await;
        }
        Ok(())
    }

    async fn refresh_file_id(&self, record: &KekRecord, sent: &Message) {
        let sent_attachment = Attachment::from_message(sent);
        let Some(file_id) = sent_attachment.file_id() else {
            return;
        };
        if record.fields.attachment_file_id.as_deref() == Some(file_id) {
            return;
        }
        if let Err(e) = self.storage.update_file_id(&record.id, file_id).await {
            warn!(error = %e, record_id = %record.id, "Failed to update file id");
        }
    }
}

impl std::fmt::Debug for Kek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kek")
            .field("refresh_file_ids", &self.refresh_file_ids)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Handler<Message> for Kek {
    async fn handle(&self, message: &Message, ctx: &EventContext) -> AlgebrachResult<()> {
        self.reply(message, ctx.api.as_ref()).await
    }
}
