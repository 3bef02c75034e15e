//! Telegram Bot API surface used by the bot.

mod api;
mod attachment;
mod client;
mod entities;
mod models;
mod summary;

pub use api::{ChatApi, EditTarget, ReplyTarget, reply_with_attachment};
pub use attachment::{Attachment, AttachmentKind, FileRef};
pub use client::{TELEGRAM_API_URL, TelegramClient};
pub use entities::{EntityKind, MessageEntity, render_html};
pub use models::{
    CallbackQuery, Chat, ChatMember, ChatMemberUpdated, ChatType, ChosenInlineResult, File,
    FileObject, InlineArticle, InlineQuery, Message, PhotoSize, Poll, PollAnswer, PollOption,
    Update, UpdateKind, User, escape_html,
};
pub use summary::{UpdateSummary, chat_info, message_info, one_liner, user_info};
