//! Command, inline and chosen-result handlers.

mod basic;
mod info;
mod inline;
mod kek;
mod suggest;
mod surprise;

pub use basic::{Help, Start};
pub use info::{KekInfo, count_by_type};
pub use inline::{CACHE_TIME, ChosenRandomKek, InlineRandomKek, InlineSearch, SEARCH_LIMIT, search_text_keks};
pub use kek::{Kek, send_record};
pub use suggest::{KekAdd, KekAddElsewhere, KekAddNoReply, KekPush};
pub use surprise::SurpriseKek;

use algebrach_error::TelegramResult;
use algebrach_social::{Attachment, ChatApi, Message, User};
use algebrach_storage::{Actor, NewKek};

/// Users-table identity of a Telegram user.
pub fn actor(user: &User) -> Actor {
    Actor {
        telegram_id: user.id,
        name: user.full_name(),
        username: user.username.clone(),
        language_code: user.language_code.clone(),
    }
}

/// Author of `message`: its sender, or the chat it was posted on behalf of.
fn author_of(message: &Message) -> Option<Actor> {
    if let Some(user) = &message.from_user {
        return Some(actor(user));
    }
    message.sender_chat.as_ref().map(|chat| Actor {
        telegram_id: chat.id,
        name: chat.title.clone().unwrap_or_default(),
        username: chat.username.clone(),
        language_code: None,
    })
}

/// Kek payload copied from `message`, with a download URL for its attachment.
async fn new_kek(api: &dyn ChatApi, message: &Message) -> TelegramResult<NewKek> {
    let attachment = Attachment::from_message(message);
    let attachment_url = match attachment.file_id() {
        Some(file_id) => Some(api.file_url(file_id).await?),
        None => None,
    };

    Ok(NewKek {
        text: message.html_text(),
        attachment_type: attachment.kind().map(|kind| kind.to_string()),
        attachment_file_id: attachment.file_id().map(str::to_string),
        attachment_filename: attachment.filename().map(str::to_string),
        attachment_url,
    })
}
