//! Serde models of the Telegram Bot API objects the bot consumes.
//!
//! Only the fields the bot reads are modelled; unknown fields are ignored.

use super::entities::{MessageEntity, render_html};
use serde::{Deserialize, Serialize};

/// A Telegram user or bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Whether this is a bot
    #[serde(default)]
    pub is_bot: bool,
    /// First name
    pub first_name: String,
    /// Last name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Username without `@`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// IETF language tag of the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

impl User {
    /// First and last name joined by a space.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }

    /// HTML link mentioning the user by id.
    pub fn mention_html(&self, name: &str) -> String {
        format!(
            "<a href=\"tg://user?id={}\">{}</a>",
            self.id,
            escape_html(name)
        )
    }
}

/// Kind of chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatType {
    /// One-to-one chat with the bot
    Private,
    /// Basic group
    Group,
    /// Supergroup
    Supergroup,
    /// Channel
    Channel,
}

/// A chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique identifier
    pub id: i64,
    /// Chat kind
    #[serde(rename = "type")]
    pub chat_type: ChatType,
    /// Title of groups and channels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Public username without `@`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// One size of a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSize {
    /// File identifier
    pub file_id: String,
    /// Width in pixels
    #[serde(default)]
    pub width: u32,
    /// Height in pixels
    #[serde(default)]
    pub height: u32,
}

/// Any non-photo file reference: audio, voice, sticker, video, video note,
/// animation or document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    /// File identifier
    pub file_id: String,
    /// Original filename, when the sender supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// A message in a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier inside the chat
    pub message_id: i64,
    /// Sender; absent for channel posts
    #[serde(default, rename = "from", skip_serializing_if = "Option::is_none")]
    pub from_user: Option<User>,
    /// Chat the message was sent on behalf of
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_chat: Option<Chat>,
    /// Chat the message belongs to
    pub chat: Chat,
    /// Unix time it was sent
    #[serde(default)]
    pub date: i64,
    /// Forum topic id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    /// Whether the message was sent to a forum topic
    #[serde(default)]
    pub is_topic_message: bool,
    /// Text of a text message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Formatting of `text`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<MessageEntity>>,
    /// Caption of a media message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Formatting of `caption`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_entities: Option<Vec<MessageEntity>>,
    /// Photo sizes, smallest first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<PhotoSize>>,
    /// Audio file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<FileObject>,
    /// Voice note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<FileObject>,
    /// Sticker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker: Option<FileObject>,
    /// Video
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<FileObject>,
    /// Round video note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_note: Option<FileObject>,
    /// GIF or silent video
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<FileObject>,
    /// General file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<FileObject>,
    /// Message this one replies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message: Option<Box<Message>>,
}

impl Message {
    /// Text, or the caption for media messages.
    pub fn text_or_caption(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }

    /// Text or caption as HTML parse-mode markup, keeping its formatting.
    pub fn html_text(&self) -> Option<String> {
        let (text, entities) = match (&self.text, &self.caption) {
            (Some(text), _) => (text, &self.entities),
            (None, Some(caption)) => (caption, &self.caption_entities),
            (None, None) => return None,
        };
        Some(render_html(text, entities.as_deref().unwrap_or_default()))
    }

    /// Content type name as the Bot API documents it.
    pub fn content_type(&self) -> &'static str {
        if self.text.is_some() {
            "text"
        } else if self.animation.is_some() {
            "animation"
        } else if self.photo.is_some() {
            "photo"
        } else if self.audio.is_some() {
            "audio"
        } else if self.voice.is_some() {
            "voice"
        } else if self.sticker.is_some() {
            "sticker"
        } else if self.video.is_some() {
            "video"
        } else if self.video_note.is_some() {
            "video_note"
        } else if self.document.is_some() {
            "document"
        } else {
            "unknown"
        }
    }

    /// Thread the message belongs to, for forum topics only.
    pub fn topic_thread_id(&self) -> Option<i64> {
        if self.is_topic_message {
            self.message_thread_id
        } else {
            None
        }
    }

    /// Public link to the message, for chats with a username.
    pub fn url(&self) -> Option<String> {
        self.chat
            .username
            .as_ref()
            .map(|username| format!("https://t.me/{}/{}", username, self.message_id))
    }
}

/// An incoming inline query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineQuery {
    /// Query identifier used to answer it
    pub id: String,
    /// Sender
    #[serde(rename = "from")]
    pub from_user: User,
    /// Query text
    #[serde(default)]
    pub query: String,
    /// Pagination offset requested by the client
    #[serde(default)]
    pub offset: String,
}

/// An inline result the user picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChosenInlineResult {
    /// Identifier of the chosen result
    pub result_id: String,
    /// User who chose it
    #[serde(rename = "from")]
    pub from_user: User,
    /// Query used to obtain the result
    #[serde(default)]
    pub query: String,
    /// Identifier of the sent inline message, if it can be edited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
}

/// A press on an inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    /// Query identifier
    pub id: String,
    /// Sender
    #[serde(rename = "from")]
    pub from_user: User,
    /// Message with the button
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Box<Message>>,
    /// Button payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// One answer option of a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    /// Option text
    pub text: String,
    /// Votes received
    #[serde(default)]
    pub voter_count: u32,
}

/// A poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    /// Poll identifier
    pub id: String,
    /// Question
    pub question: String,
    /// Answer options
    #[serde(default)]
    pub options: Vec<PollOption>,
    /// Users that voted
    #[serde(default)]
    pub total_voter_count: u32,
}

/// A vote in a non-anonymous poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollAnswer {
    /// Poll identifier
    pub poll_id: String,
    /// Voter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Chosen option indexes
    #[serde(default)]
    pub option_ids: Vec<u32>,
}

/// Membership of a user in a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMember {
    /// Member status (`creator`, `administrator`, `member`, …)
    pub status: String,
    /// The member
    pub user: User,
}

/// A change of someone's chat membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMemberUpdated {
    /// Chat the change happened in
    pub chat: Chat,
    /// Who made the change
    #[serde(rename = "from")]
    pub from_user: User,
    /// Previous membership
    pub old_chat_member: ChatMember,
    /// New membership
    pub new_chat_member: ChatMember,
}

/// A file ready to be downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// File identifier
    pub file_id: String,
    /// Path to pass to the file download endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// Inline result that sends a text message when picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineArticle {
    /// Result identifier, unique within one answer
    pub id: String,
    /// Title shown in the result list
    pub title: String,
    /// Second line shown in the result list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Text sent to the chat
    pub message_text: String,
}

/// One inbound envelope from `getUpdates`.
///
/// Exactly one of the optional payloads is set for the update kinds the bot
/// subscribes to; [`Update::kind`] gives a typed view of whichever it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// Monotonic update identifier
    pub update_id: i64,
    /// New message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Edited message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_message: Option<Message>,
    /// New channel post
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_post: Option<Message>,
    /// Edited channel post
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_channel_post: Option<Message>,
    /// Inline query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_query: Option<InlineQuery>,
    /// Chosen inline result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_inline_result: Option<ChosenInlineResult>,
    /// Callback query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,
    /// Poll state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<Poll>,
    /// Poll vote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_answer: Option<PollAnswer>,
    /// The bot's own membership changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_chat_member: Option<ChatMemberUpdated>,
    /// Someone's membership changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_member: Option<ChatMemberUpdated>,
}

/// Borrowed view of the payload of an [`Update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind<'a> {
    /// New message
    Message(&'a Message),
    /// Edited message
    EditedMessage(&'a Message),
    /// New channel post
    ChannelPost(&'a Message),
    /// Edited channel post
    EditedChannelPost(&'a Message),
    /// Inline query
    InlineQuery(&'a InlineQuery),
    /// Chosen inline result
    ChosenInlineResult(&'a ChosenInlineResult),
    /// Callback query
    CallbackQuery(&'a CallbackQuery),
    /// Poll state
    Poll(&'a Poll),
    /// Poll vote
    PollAnswer(&'a PollAnswer),
    /// Membership change
    ChatMember(&'a ChatMemberUpdated),
    /// Nothing the bot understands
    Unknown,
}

impl<'a> UpdateKind<'a> {
    /// Name of the payload type, used as the log prefix.
    pub fn name(&self) -> &'static str {
        match self {
            UpdateKind::Message(_)
            | UpdateKind::EditedMessage(_)
            | UpdateKind::ChannelPost(_)
            | UpdateKind::EditedChannelPost(_) => "Message",
            UpdateKind::InlineQuery(_) => "InlineQuery",
            UpdateKind::ChosenInlineResult(_) => "ChosenInlineResult",
            UpdateKind::CallbackQuery(_) => "CallbackQuery",
            UpdateKind::Poll(_) => "Poll",
            UpdateKind::PollAnswer(_) => "PollAnswer",
            UpdateKind::ChatMember(_) => "ChatMemberUpdated",
            UpdateKind::Unknown => "Update",
        }
    }
}

impl Update {
    /// Typed view of the payload.
    pub fn kind(&self) -> UpdateKind<'_> {
        if let Some(m) = &self.message {
            UpdateKind::Message(m)
        } else if let Some(m) = &self.edited_message {
            UpdateKind::EditedMessage(m)
        } else if let Some(m) = &self.channel_post {
            UpdateKind::ChannelPost(m)
        } else if let Some(m) = &self.edited_channel_post {
            UpdateKind::EditedChannelPost(m)
        } else if let Some(q) = &self.inline_query {
            UpdateKind::InlineQuery(q)
        } else if let Some(r) = &self.chosen_inline_result {
            UpdateKind::ChosenInlineResult(r)
        } else if let Some(q) = &self.callback_query {
            UpdateKind::CallbackQuery(q)
        } else if let Some(p) = &self.poll {
            UpdateKind::Poll(p)
        } else if let Some(a) = &self.poll_answer {
            UpdateKind::PollAnswer(a)
        } else if let Some(c) = self.chat_member.as_ref().or(self.my_chat_member.as_ref()) {
            UpdateKind::ChatMember(c)
        } else {
            UpdateKind::Unknown
        }
    }
}

/// Escape `<`, `>` and `&` for HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
