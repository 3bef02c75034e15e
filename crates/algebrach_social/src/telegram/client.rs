//! Bot API client.

use crate::{
    AttachmentKind, ChatApi, ChatMember, EditTarget, File, InlineArticle, Message, ReplyTarget,
    Update, User,
};
use algebrach_error::{TelegramError, TelegramErrorKind, TelegramResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Public Bot API root.
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<i64>,
    description: Option<String>,
}

/// [`ChatApi`] over the Telegram Bot HTTP API.
///
/// Messages go out with HTML parse mode and without notifications, and
/// replies still send when the original message is gone.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    token: String,
    api_url: String,
}

impl TelegramClient {
    /// Client authenticated with a BotFather token.
    pub fn new(token: impl Into<String>) -> Self {
        debug!("Creating new Telegram client");
        Self {
            client: Client::new(),
            token: token.into(),
            api_url: TELEGRAM_API_URL.to_string(),
        }
    }

    /// Point the client at another API root.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    /// Call `method` with a JSON body and decode its `result`.
    #[instrument(skip(self, body))]
    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value, timeout: Duration) -> TelegramResult<T> {
        let response = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Telegram request failed");
                TelegramError::new(TelegramErrorKind::Transport(e.to_string()))
            })?;

        let answer: ApiResponse<T> = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to decode Telegram response");
            TelegramError::new(TelegramErrorKind::Decode(e.to_string()))
        })?;

        match answer {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                error_code: Some(400),
                description,
                ..
            } => Err(TelegramError::new(TelegramErrorKind::BadRequest(
                description.unwrap_or_default(),
            ))),
            ApiResponse {
                error_code,
                description,
                ..
            } => Err(TelegramError::new(TelegramErrorKind::Api {
                code: error_code.unwrap_or_default(),
                description: description.unwrap_or_else(|| "empty result".to_string()),
            })),
        }
    }
}

fn message_body(target: ReplyTarget) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("chat_id".into(), json!(target.chat_id));
    body.insert("parse_mode".into(), json!("HTML"));
    body.insert("disable_notification".into(), json!(true));
    if let Some(thread_id) = target.message_thread_id {
        body.insert("message_thread_id".into(), json!(thread_id));
    }
    if let Some(message_id) = target.reply_to_message_id {
        body.insert(
            "reply_parameters".into(),
            json!({"message_id": message_id, "allow_sending_without_reply": true}),
        );
    }
    body
}

#[async_trait]
impl ChatApi for TelegramClient {
    async fn send_text(&self, target: ReplyTarget, text: &str) -> TelegramResult<Message> {
        let mut body = message_body(target);
        body.insert("text".into(), json!(text));
        self.call("sendMessage", Value::Object(body), REQUEST_TIMEOUT).await
    }

    async fn send_media(
        &self,
        target: ReplyTarget,
        kind: AttachmentKind,
        media: &str,
        caption: Option<&str>,
    ) -> TelegramResult<Message> {
        let mut body = message_body(target);
        body.insert(kind.to_string(), json!(media));
        if let Some(caption) = caption.filter(|_| kind.accepts_caption()) {
            body.insert("caption".into(), json!(caption));
        }
        self.call(kind.send_method(), Value::Object(body), REQUEST_TIMEOUT).await
    }

    async fn edit_text(&self, target: EditTarget, text: &str) -> TelegramResult<()> {
        let body = match target {
            EditTarget::Chat {
                chat_id,
                message_id,
            } => json!({"chat_id": chat_id, "message_id": message_id, "text": text, "parse_mode": "HTML"}),
            EditTarget::Inline(inline_message_id) => {
                json!({"inline_message_id": inline_message_id, "text": text, "parse_mode": "HTML"})
            }
        };
        self.call::<Value>("editMessageText", body, REQUEST_TIMEOUT).await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> TelegramResult<()> {
        let body = json!({"chat_id": chat_id, "message_id": message_id});
        self.call::<bool>("deleteMessage", body, REQUEST_TIMEOUT).await?;
        Ok(())
    }

    async fn restrict_member(&self, chat_id: i64, user_id: i64, until: i64) -> TelegramResult<()> {
        let body = json!({
            "chat_id": chat_id,
            "user_id": user_id,
            "permissions": {"can_send_messages": false, "can_send_other_messages": false},
            "until_date": until,
        });
        self.call::<bool>("restrictChatMember", body, REQUEST_TIMEOUT).await?;
        Ok(())
    }

    async fn chat_administrators(&self, chat_id: i64) -> TelegramResult<Vec<ChatMember>> {
        self.call("getChatAdministrators", json!({"chat_id": chat_id}), REQUEST_TIMEOUT)
            .await
    }

    async fn answer_inline_query(
        &self,
        query_id: &str,
        results: Vec<InlineArticle>,
        cache_time: u32,
        is_personal: bool,
    ) -> TelegramResult<()> {
        let results: Vec<Value> = results
            .into_iter()
            .map(|article| {
                json!({
                    "type": "article",
                    "id": article.id,
                    "title": article.title,
                    "description": article.description,
                    "input_message_content": {
                        "message_text": article.message_text,
                        "parse_mode": "HTML",
                    },
                })
            })
            .collect();
        let body = json!({
            "inline_query_id": query_id,
            "results": results,
            "cache_time": cache_time,
            "is_personal": is_personal,
        });
        self.call::<bool>("answerInlineQuery", body, REQUEST_TIMEOUT).await?;
        Ok(())
    }

    async fn file_url(&self, file_id: &str) -> TelegramResult<String> {
        let file: File = self
            .call("getFile", json!({"file_id": file_id}), REQUEST_TIMEOUT)
            .await?;
        let path = file.file_path.ok_or_else(|| {
            TelegramError::new(TelegramErrorKind::Decode(format!(
                "file {} has no download path",
                file_id
            )))
        })?;
        Ok(format!("{}/file/bot{}/{}", self.api_url, self.token, path))
    }

    async fn updates(&self, offset: Option<i64>, timeout_secs: u32) -> TelegramResult<Vec<Update>> {
        let body = json!({"offset": offset, "timeout": timeout_secs});
        let timeout = REQUEST_TIMEOUT + Duration::from_secs(u64::from(timeout_secs));
        self.call("getUpdates", body, timeout).await
    }

    async fn me(&self) -> TelegramResult<User> {
        self.call("getMe", json!({}), REQUEST_TIMEOUT).await
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}
