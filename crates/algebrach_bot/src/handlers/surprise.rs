//! Surprise kek: a random read-only sentence instead of a kek.

use super::Kek;
use crate::texts;
use algebrach_error::AlgebrachResult;
use algebrach_social::{AttachmentKind, EditTarget, EventContext, Handler, Message, ReplyTarget};
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Longest read-only sentence, in minutes.
pub const MAX_READONLY_MINUTES: i64 = 60;

const ROLL_PAUSE: Duration = Duration::from_secs(1);
const SPARED_PAUSE: Duration = Duration::from_secs(3);

/// Sends the surprise animation, then mutes the caller for 1 to 60 minutes.
///
/// Configured admins and administrators of the chat are spared: the
/// animation is cleaned up and they get a regular kek.
pub struct SurpriseKek {
    kek: Arc<Kek>,
    admin_ids: Vec<i64>,
    animation: String,
}

impl SurpriseKek {
    /// Surprise falling back to `kek` for admins.
    pub fn new(kek: Arc<Kek>, admin_ids: Vec<i64>, animation: impl Into<String>) -> Self {
        Self {
            kek,
            admin_ids,
            animation: animation.into(),
        }
    }
}

impl std::fmt::Debug for SurpriseKek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurpriseKek")
            .field("admin_ids", &self.admin_ids)
            .field("animation", &self.animation)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Handler<Message> for SurpriseKek {
    #[instrument(skip_all, fields(chat_id = message.chat.id, message_id = message.message_id))]
    async fn handle(&self, message: &Message, ctx: &EventContext) -> AlgebrachResult<()> {
        let api = ctx.api.as_ref();
        let Some(user) = &message.from_user else {
            return self.kek.reply(message, api).await;
        };

        let surprise = api
            .send_media(
                ReplyTarget::reply_to(message),
                AttachmentKind::Animation,
                &self.animation,
                Some(texts::SURPRISE_CAPTION),
            )
            .await?;

        let is_admin = self.admin_ids.contains(&user.id)
            || api
                .chat_administrators(message.chat.id)
                .await?
                .iter()
                .any(|member| member.user.id == user.id);

        if is_admin {
            info!(user_id = user.id, "Admin spared by the surprise");
            let spared = api
                .send_text(ReplyTarget::reply_to(&surprise), texts::SURPRISE_SPARED)
                .await?;
            tokio::time::sleep(SPARED_PAUSE).await;
            api.delete_message(surprise.chat.id, surprise.message_id).await?;
            api.delete_message(spared.chat.id, spared.message_id).await?;
            return self.kek.reply(message, api).await;
        }

        let minutes: i64 = rand::thread_rng().gen_range(1..=MAX_READONLY_MINUTES);
        tokio::time::sleep(ROLL_PAUSE).await;

        let roll = api
            .send_text(ReplyTarget::reply_to(message), texts::SURPRISE_ROLL)
            .await?;
        tokio::time::sleep(ROLL_PAUSE).await;

        api.edit_text(EditTarget::message(&roll), &minutes.to_string())
            .await?;
        tokio::time::sleep(ROLL_PAUSE).await;

        let sentence = texts::surprise_sentence(&user.mention_html(&user.first_name), minutes);
        api.edit_text(EditTarget::message(&roll), &sentence).await?;
        api.delete_message(surprise.chat.id, surprise.message_id).await?;

        let until = chrono::Utc::now().timestamp() + minutes * 60;
        api.restrict_member(message.chat.id, user.id, until).await?;
        info!(user_id = user.id, minutes, "Surprise read-only sentence");
        Ok(())
    }
}
