//! One-line human readable descriptions of updates for logs.

use crate::{Chat, ChatType, Message, Update, UpdateKind, User};

/// Collapse newlines and runs of spaces, then cut to `cut_len` characters.
///
/// # Examples
///
/// ```
/// use algebrach_social::one_liner;
///
/// assert_eq!(one_liner("a\n\nb   c", None), "a b c");
/// assert_eq!(one_liner("abcdef", Some(3)), "abc");
/// ```
pub fn one_liner(text: &str, cut_len: Option<usize>) -> String {
    let mut line = String::with_capacity(text.len());
    let mut previous_space = false;
    for c in text.chars() {
        let c = if c == '\n' { ' ' } else { c };
        if c == ' ' && previous_space {
            continue;
        }
        previous_space = c == ' ';
        line.push(c);
    }
    match cut_len {
        Some(len) => line.chars().take(len).collect(),
        None => line,
    }
}

/// `First Last (id, @username, lang)`, or the sender chat when present.
pub fn user_info(user: &User, sender_chat: Option<&Chat>) -> String {
    if let Some(chat) = sender_chat {
        return chat_info(chat);
    }

    let mut info = user.full_name();
    info.push_str(&format!(" ({}", user.id));
    if let Some(username) = &user.username {
        info.push_str(&format!(", @{}", username));
    }
    if let Some(language_code) = &user.language_code {
        info.push_str(&format!(", {}", language_code));
    }
    info.push(')');
    info
}

/// `private`, or `type | title (id, @username)` for groups and channels.
pub fn chat_info(chat: &Chat) -> String {
    if chat.chat_type == ChatType::Private {
        return "private".to_string();
    }

    let username = chat
        .username
        .as_ref()
        .map(|username| format!(", @{}", username))
        .unwrap_or_default();
    format!(
        "{} | {} ({}{})",
        chat.chat_type,
        chat.title.as_deref().unwrap_or_default(),
        chat.id,
        username
    )
}

/// `message_id | text` or `message_id | type: content type`.
pub fn message_info(message: &Message) -> String {
    match &message.text {
        Some(text) => format!("{} | {}", message.message_id, one_liner(text, Some(50))),
        None => format!("{} | type: {}", message.message_id, message.content_type()),
    }
}

/// The parts of an update that go into its log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Payload type name
    pub kind: &'static str,
    /// Formatted chat, if the update has one
    pub chat: Option<String>,
    /// Formatted actor, if the update has one
    pub user: Option<String>,
    /// Payload specific detail
    pub info: String,
}

impl UpdateSummary {
    /// Break `update` down for logging.
    pub fn of(update: &Update) -> Self {
        let kind = update.kind();
        let message_parts = |message: &Message, suffix: &str| {
            (
                Some(chat_info(&message.chat)),
                message
                    .from_user
                    .as_ref()
                    .map(|user| user_info(user, message.sender_chat.as_ref())),
                format!("{}{}", message_info(message), suffix),
            )
        };

        let (chat, user, info) = match kind {
            UpdateKind::Message(m) => message_parts(m, ""),
            UpdateKind::EditedMessage(m) => message_parts(m, " [edited]"),
            UpdateKind::ChannelPost(m) => (Some(chat_info(&m.chat)), None, message_info(m)),
            UpdateKind::EditedChannelPost(m) => (
                Some(chat_info(&m.chat)),
                None,
                format!("{} [edited]", message_info(m)),
            ),
            UpdateKind::InlineQuery(q) => (
                None,
                Some(user_info(&q.from_user, None)),
                one_liner(&q.query, Some(50)),
            ),
            UpdateKind::ChosenInlineResult(r) => (
                None,
                Some(user_info(&r.from_user, None)),
                one_liner(&r.query, Some(50)),
            ),
            UpdateKind::CallbackQuery(q) => (
                q.message.as_ref().map(|m| chat_info(&m.chat)),
                Some(user_info(&q.from_user, None)),
                q.data.clone().unwrap_or_default(),
            ),
            UpdateKind::Poll(p) => {
                let options: Vec<&str> = p.options.iter().map(|o| o.text.as_str()).collect();
                (
                    None,
                    None,
                    format!(
                        "{} ({}), {:?}, {} voter(s)",
                        one_liner(&p.question, Some(50)),
                        p.id,
                        options,
                        p.total_voter_count
                    ),
                )
            }
            UpdateKind::PollAnswer(a) => (
                None,
                a.user.as_ref().map(|u| user_info(u, None)),
                format!("{:?} ({})", a.option_ids, a.poll_id),
            ),
            UpdateKind::ChatMember(c) => (
                Some(chat_info(&c.chat)),
                Some(user_info(&c.from_user, None)),
                format!(
                    "{}: {} -> {}",
                    user_info(&c.new_chat_member.user, None),
                    c.old_chat_member.status,
                    c.new_chat_member.status
                ),
            ),
            UpdateKind::Unknown => (
                None,
                None,
                serde_json::to_string(update).unwrap_or_default(),
            ),
        };

        Self {
            kind: kind.name(),
            chat,
            user,
            info,
        }
    }

    /// `<Kind> [<elapsed> ms] | <chat> | <user> | <info>`, absent parts omitted.
    pub fn log_line(&self, elapsed_ms: u128) -> String {
        let mut line = format!("{} [{:>4} ms]", self.kind, elapsed_ms);
        if let Some(chat) = &self.chat {
            line.push_str(" | ");
            line.push_str(chat);
        }
        if let Some(user) = &self.user {
            line.push_str(" | ");
            line.push_str(user);
        }
        line.push_str(" | ");
        line.push_str(&self.info);
        line
    }
}
