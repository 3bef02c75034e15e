//! Per-update context handed to middlewares and handlers.

use crate::{ChatApi, Chat, Update, UpdateKind, User};
use std::sync::Arc;

/// Whether an update reached a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Outcome {
    /// A handler ran, or a middleware answered on its behalf
    Handled,
    /// Nothing matched, or a middleware dropped the update
    Unhandled,
}

/// Actor, chat and topic of an update, plus the reply sink.
#[derive(Clone)]
pub struct EventContext {
    /// Reply sink
    pub api: Arc<dyn ChatApi>,
    /// Acting user
    pub user: Option<User>,
    /// Chat the update happened in
    pub chat: Option<Chat>,
    /// Forum topic
    pub thread_id: Option<i64>,
}

impl EventContext {
    /// Resolve who did what where for `update`.
    pub fn extract(update: &Update, api: Arc<dyn ChatApi>) -> Self {
        let (user, chat, thread_id) = match update.kind() {
            UpdateKind::Message(m) | UpdateKind::EditedMessage(m) => {
                (m.from_user.clone(), Some(m.chat.clone()), m.topic_thread_id())
            }
            UpdateKind::ChannelPost(m) | UpdateKind::EditedChannelPost(m) => {
                (None, Some(m.chat.clone()), m.topic_thread_id())
            }
            UpdateKind::InlineQuery(q) => (Some(q.from_user.clone()), None, None),
            UpdateKind::ChosenInlineResult(r) => (Some(r.from_user.clone()), None, None),
            UpdateKind::CallbackQuery(q) => (
                Some(q.from_user.clone()),
                q.message.as_ref().map(|m| m.chat.clone()),
                q.message.as_ref().and_then(|m| m.topic_thread_id()),
            ),
            UpdateKind::PollAnswer(a) => (a.user.clone(), None, None),
            UpdateKind::ChatMember(c) => (Some(c.from_user.clone()), Some(c.chat.clone()), None),
            UpdateKind::Poll(_) | UpdateKind::Unknown => (None, None, None),
        };

        Self {
            api,
            user,
            chat,
            thread_id,
        }
    }
}

impl std::fmt::Debug for EventContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventContext")
            .field("user", &self.user.as_ref().map(|u| u.id))
            .field("chat", &self.chat.as_ref().map(|c| c.id))
            .field("thread_id", &self.thread_id)
            .finish_non_exhaustive()
    }
}
