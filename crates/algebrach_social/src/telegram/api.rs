//! The reply sink the bot talks to.

use crate::{Attachment, AttachmentKind, ChatMember, InlineArticle, Message, Update, User};
use algebrach_error::TelegramResult;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Where an outgoing message goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTarget {
    /// Destination chat
    pub chat_id: i64,
    /// Message being replied to
    pub reply_to_message_id: Option<i64>,
    /// Forum topic
    pub message_thread_id: Option<i64>,
}

impl ReplyTarget {
    /// Reply to `message` in its chat and topic.
    pub fn reply_to(message: &Message) -> Self {
        Self {
            chat_id: message.chat.id,
            reply_to_message_id: Some(message.message_id),
            message_thread_id: message.topic_thread_id(),
        }
    }

    /// A fresh message in `chat_id`.
    pub fn chat(chat_id: i64) -> Self {
        Self {
            chat_id,
            reply_to_message_id: None,
            message_thread_id: None,
        }
    }
}

/// Message whose text can be edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// Message in a chat
    Chat {
        /// Chat id
        chat_id: i64,
        /// Message id
        message_id: i64,
    },
    /// Message sent through inline mode
    Inline(String),
}

impl EditTarget {
    /// Edit `message`.
    pub fn message(message: &Message) -> Self {
        EditTarget::Chat {
            chat_id: message.chat.id,
            message_id: message.message_id,
        }
    }
}

/// Chat platform operations the bot needs.
///
/// [`crate::TelegramClient`] implements it over the Bot API; tests use
/// recording implementations.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send a text message.
    async fn send_text(&self, target: ReplyTarget, text: &str) -> TelegramResult<Message>;

    /// Send media referenced by file id or URL, with an optional caption.
    async fn send_media(
        &self,
        target: ReplyTarget,
        kind: AttachmentKind,
        media: &str,
        caption: Option<&str>,
    ) -> TelegramResult<Message>;

    /// Replace the text of a sent message.
    async fn edit_text(&self, target: EditTarget, text: &str) -> TelegramResult<()>;

    /// Delete a message.
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> TelegramResult<()>;

    /// Forbid `user_id` from sending anything in `chat_id` until the unix time `until`.
    async fn restrict_member(&self, chat_id: i64, user_id: i64, until: i64) -> TelegramResult<()>;

    /// Administrators of a group.
    async fn chat_administrators(&self, chat_id: i64) -> TelegramResult<Vec<ChatMember>>;

    /// Answer an inline query.
    async fn answer_inline_query(
        &self,
        query_id: &str,
        results: Vec<InlineArticle>,
        cache_time: u32,
        is_personal: bool,
    ) -> TelegramResult<()>;

    /// Download URL of a file; embeds the bot token.
    async fn file_url(&self, file_id: &str) -> TelegramResult<String>;

    /// Long-poll for updates after `offset`.
    async fn updates(&self, offset: Option<i64>, timeout_secs: u32) -> TelegramResult<Vec<Update>>;

    /// The bot's own account.
    async fn me(&self) -> TelegramResult<User>;
}

/// Reply with `text` and whatever `attachment` holds.
///
/// Plain text goes out as a message. Files are sent by id; if the API rejects
/// the id as a bad request and `url_fallback` is known, the same file is sent
/// once more by URL.
pub async fn reply_with_attachment(
    api: &dyn ChatApi,
    target: ReplyTarget,
    text: Option<&str>,
    attachment: &Attachment,
    url_fallback: Option<&str>,
) -> TelegramResult<Message> {
    let Attachment::File { kind, file } = attachment else {
        return api.send_text(target, text.unwrap_or_default()).await;
    };

    debug!(kind = %kind, file_id = %file.file_id, "Replying with attachment");
    match api.send_media(target, *kind, &file.file_id, text).await {
        Err(e) if e.is_bad_request() => match url_fallback {
            Some(url) => {
                warn!(error = %e, kind = %kind, "File id rejected, sending by URL");
                api.send_media(target, *kind, url, text).await
            }
            None => Err(e),
        },
        sent => sent,
    }
}
