//! End-to-end tests of the bot's routers against an in-memory kek base.

use algebrach_bot::{Settings, build_dispatcher, texts};
use algebrach_error::{TelegramError, TelegramErrorKind, TelegramResult};
use algebrach_social::{
    AttachmentKind, ChatApi, ChatMember, Dispatcher, EditTarget, InlineArticle, Message, Outcome,
    ReplyTarget, Update, User,
};
use algebrach_storage::{InMemoryRecordStore, KekStorage, KekStorageConfig, Table};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

const MAIN_CHAT: i64 = -1001091546301;
const OTHER_CHAT: i64 = -100777;
const OWNER: i64 = 28006241;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Text { chat_id: i64, text: String },
    Media { kind: AttachmentKind, media: String, caption: Option<String> },
    Edit { target: EditTarget, text: String },
    Delete { message_id: i64 },
    Restrict { user_id: i64, until: i64 },
    Inline { results: Vec<InlineArticle> },
}

/// Records every call; media sends come back carrying `returned_file_id`.
#[derive(Default)]
struct FakeApi {
    calls: Mutex<Vec<Call>>,
    admins: Vec<i64>,
    reject_file_ids: bool,
    returned_file_id: Option<String>,
    next_id: AtomicI64,
}

impl FakeApi {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn sent(&self, chat_id: i64, extra: Value) -> Message {
        let mut message = json!({
            "message_id": 1000 + self.next_id.fetch_add(1, Ordering::SeqCst),
            "chat": {"id": chat_id, "type": "supergroup"},
        });
        if let (Value::Object(message), Value::Object(extra)) = (&mut message, extra) {
            message.extend(extra);
        }
        serde_json::from_value(message).unwrap()
    }
}

#[async_trait]
impl ChatApi for FakeApi {
    async fn send_text(&self, target: ReplyTarget, text: &str) -> TelegramResult<Message> {
        self.calls.lock().push(Call::Text {
            chat_id: target.chat_id,
            text: text.to_string(),
        });
        Ok(self.sent(target.chat_id, json!({"text": text})))
    }

    async fn send_media(
        &self,
        target: ReplyTarget,
        kind: AttachmentKind,
        media: &str,
        caption: Option<&str>,
    ) -> TelegramResult<Message> {
        self.calls.lock().push(Call::Media {
            kind,
            media: media.to_string(),
            caption: caption.map(str::to_string),
        });
        if self.reject_file_ids && !media.starts_with("http") {
            return Err(TelegramError::new(TelegramErrorKind::BadRequest(
                "wrong file identifier".into(),
            )));
        }
        let file_id = self.returned_file_id.clone().unwrap_or_else(|| media.to_string());
        let extra = match kind {
            AttachmentKind::Photo => json!({"photo": [{"file_id": file_id}]}),
            kind => {
                let mut extra = serde_json::Map::new();
                extra.insert(kind.to_string(), json!({"file_id": file_id}));
                Value::Object(extra)
            }
        };
        Ok(self.sent(target.chat_id, extra))
    }

    async fn edit_text(&self, target: EditTarget, text: &str) -> TelegramResult<()> {
        self.calls.lock().push(Call::Edit {
            target,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete_message(&self, _chat_id: i64, message_id: i64) -> TelegramResult<()> {
        self.calls.lock().push(Call::Delete { message_id });
        Ok(())
    }

    async fn restrict_member(&self, _chat_id: i64, user_id: i64, until: i64) -> TelegramResult<()> {
        self.calls.lock().push(Call::Restrict { user_id, until });
        Ok(())
    }

    async fn chat_administrators(&self, _chat_id: i64) -> TelegramResult<Vec<ChatMember>> {
        Ok(self
            .admins
            .iter()
            .map(|id| {
                serde_json::from_value(json!({
                    "status": "administrator",
                    "user": {"id": id, "first_name": "Admin"},
                }))
                .unwrap()
            })
            .collect())
    }

    async fn answer_inline_query(
        &self,
        _query_id: &str,
        results: Vec<InlineArticle>,
        _cache_time: u32,
        _is_personal: bool,
    ) -> TelegramResult<()> {
        self.calls.lock().push(Call::Inline { results });
        Ok(())
    }

    async fn file_url(&self, file_id: &str) -> TelegramResult<String> {
        Ok(format!("https://files.test/{}", file_id))
    }

    async fn updates(&self, _offset: Option<i64>, _timeout_secs: u32) -> TelegramResult<Vec<Update>> {
        Ok(Vec::new())
    }

    async fn me(&self) -> TelegramResult<User> {
        Ok(serde_json::from_value(json!({"id": 1, "is_bot": true, "first_name": "algebrach", "username": "algebrach_bot"})).unwrap())
    }
}

fn settings(overrides: Value) -> Settings {
    let mut base = json!({
        "environment": "test",
        "telegram_bot_token": "123:token",
        "airtable_access_token": "pat",
        "surprise_chance": 0.0,
    });
    if let (Value::Object(base), Value::Object(overrides)) = (&mut base, overrides) {
        base.extend(overrides);
    }
    serde_json::from_value(base).unwrap()
}

struct Harness {
    api: Arc<FakeApi>,
    store: Arc<InMemoryRecordStore>,
    dispatcher: Dispatcher,
}

fn harness(settings: Settings, api: FakeApi) -> Harness {
    let api = Arc::new(api);
    let store = Arc::new(InMemoryRecordStore::new());
    let storage = Arc::new(KekStorage::new(
        store.clone(),
        KekStorageConfig::default().with_call_timeout(None),
    ));
    let dispatcher = build_dispatcher(&settings, api.clone(), storage)
        .unwrap()
        .with_bot_username("algebrach_bot");
    Harness {
        api,
        store,
        dispatcher,
    }
}

fn command(text: &str, chat_id: i64, from: i64, reply: Option<Value>) -> Update {
    let mut message = json!({
        "message_id": 42,
        "date": 1700000000,
        "chat": {"id": chat_id, "type": "supergroup", "username": "mechmath"},
        "from": {"id": from, "first_name": "Ann", "username": "ann"},
        "text": text,
    });
    if let Some(reply) = reply {
        message["reply_to_message"] = reply;
    }
    serde_json::from_value(json!({"update_id": 1, "message": message})).unwrap()
}

fn replied(extra: Value) -> Value {
    let mut message = json!({
        "message_id": 41,
        "chat": {"id": MAIN_CHAT, "type": "supergroup", "username": "mechmath"},
        "from": {"id": 10, "first_name": "Bob", "last_name": "Smith", "language_code": "ru"},
    });
    if let (Value::Object(message), Value::Object(extra)) = (&mut message, extra) {
        message.extend(extra);
    }
    message
}

#[tokio::test]
async fn test_text_kek_is_sent_as_text() {
    let h = harness(settings(json!({})), FakeApi::default());
    h.store.seed(Table::List, json!({"Text": "Test kek"}));

    let outcome = h.dispatcher.feed_update(&command("/kek", OTHER_CHAT, 5, None)).await;

    assert_eq!(outcome, Outcome::Handled);
    assert_eq!(
        h.api.calls(),
        vec![Call::Text {
            chat_id: OTHER_CHAT,
            text: "Test kek".to_string()
        }]
    );
}

#[tokio::test]
async fn test_photo_kek_goes_through_photo_path() {
    let h = harness(settings(json!({})), FakeApi::default());
    h.store.seed(
        Table::List,
        json!({"Text": "Photo caption", "AttachmentType": "photo", "AttachmentFileID": "photo_id_123"}),
    );

    h.dispatcher.feed_update(&command("/kek", OTHER_CHAT, 5, None)).await;

    assert_eq!(
        h.api.calls(),
        vec![Call::Media {
            kind: AttachmentKind::Photo,
            media: "photo_id_123".to_string(),
            caption: Some("Photo caption".to_string()),
        }]
    );
}

#[tokio::test]
async fn test_rejected_file_id_falls_back_to_url() {
    let api = FakeApi {
        reject_file_ids: true,
        ..FakeApi::default()
    };
    let h = harness(settings(json!({})), api);
    h.store.seed(
        Table::List,
        json!({
            "AttachmentType": "sticker",
            "AttachmentFileID": "stale",
            "Attachment": [{"url": "https://dl.airtable.test/sticker.webp"}],
        }),
    );

    h.dispatcher.feed_update(&command("/kek", OTHER_CHAT, 5, None)).await;

    let media: Vec<String> = h
        .api
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Media { media, .. } => Some(media),
            _ => None,
        })
        .collect();
    assert_eq!(media, vec!["stale", "https://dl.airtable.test/sticker.webp"]);
}

#[tokio::test]
async fn test_prod_refreshes_changed_file_id() {
    let api = FakeApi {
        returned_file_id: Some("fresh_id".to_string()),
        ..FakeApi::default()
    };
    let h = harness(settings(json!({"environment": "prod"})), api);
    let id = h.store.seed(
        Table::List,
        json!({"Text": "kek", "AttachmentType": "photo", "AttachmentFileID": "old_id"}),
    );

    h.dispatcher.feed_update(&command("/kek", OTHER_CHAT, 5, None)).await;

    let stored = h.store.records(Table::List);
    assert_eq!(stored[0]["id"], id.as_str());
    assert_eq!(stored[0]["fields"]["AttachmentFileID"], "fresh_id");
}

#[tokio::test]
async fn test_test_environment_keeps_file_id() {
    let api = FakeApi {
        returned_file_id: Some("fresh_id".to_string()),
        ..FakeApi::default()
    };
    let h = harness(settings(json!({})), api);
    h.store.seed(
        Table::List,
        json!({"Text": "kek", "AttachmentType": "photo", "AttachmentFileID": "old_id"}),
    );

    h.dispatcher.feed_update(&command("/kek", OTHER_CHAT, 5, None)).await;

    assert_eq!(h.store.records(Table::List)[0]["fields"]["AttachmentFileID"], "old_id");
}

#[tokio::test]
async fn test_empty_base_says_so() {
    let h = harness(settings(json!({})), FakeApi::default());

    h.dispatcher.feed_update(&command("/kek", OTHER_CHAT, 5, None)).await;

    assert_eq!(
        h.api.calls(),
        vec![Call::Text {
            chat_id: OTHER_CHAT,
            text: texts::NO_KEKS.to_string()
        }]
    );
}

#[tokio::test]
async fn test_start_and_help() {
    let h = harness(settings(json!({})), FakeApi::default());

    h.dispatcher.feed_update(&command("/start", OTHER_CHAT, 5, None)).await;
    h.dispatcher.feed_update(&command("/help@algebrach_bot", OTHER_CHAT, 5, None)).await;

    assert_eq!(
        h.api.calls(),
        vec![
            Call::Text { chat_id: OTHER_CHAT, text: texts::START.to_string() },
            Call::Text { chat_id: OTHER_CHAT, text: texts::HELP.to_string() },
        ]
    );
}

#[tokio::test]
async fn test_kek_add_outside_main_chat() {
    let h = harness(settings(json!({})), FakeApi::default());

    h.dispatcher
        .feed_update(&command("/kek_add", OTHER_CHAT, 5, Some(replied(json!({"text": "kek"})))))
        .await;

    assert_eq!(
        h.api.calls(),
        vec![Call::Text { chat_id: OTHER_CHAT, text: texts::KEK_ADD_ELSEWHERE.to_string() }]
    );
    assert!(h.store.records(Table::Suggestions).is_empty());
}

#[tokio::test]
async fn test_kek_add_without_reply() {
    let h = harness(settings(json!({})), FakeApi::default());

    h.dispatcher.feed_update(&command("/kek_add", MAIN_CHAT, 5, None)).await;

    assert_eq!(
        h.api.calls(),
        vec![Call::Text { chat_id: MAIN_CHAT, text: texts::KEK_ADD_NO_REPLY.to_string() }]
    );
}

#[tokio::test]
async fn test_kek_add_creates_suggestion() {
    let h = harness(settings(json!({})), FakeApi::default());
    let reply = replied(json!({"photo": [{"file_id": "small"}, {"file_id": "large"}], "caption": "Матан"}));

    h.dispatcher
        .feed_update(&command("/kek_add", MAIN_CHAT, 5, Some(reply)))
        .await;

    let suggestions = h.store.records(Table::Suggestions);
    assert_eq!(suggestions.len(), 1);
    let fields = &suggestions[0]["fields"];
    assert_eq!(fields["Text"], "Матан");
    assert_eq!(fields["AttachmentType"], "photo");
    assert_eq!(fields["AttachmentFileID"], "large");
    assert_eq!(h.store.records(Table::Users).len(), 2);

    let calls = h.api.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(
        &calls[0],
        Call::Text { text, .. } if text.contains("https://t.me/mechmath/41") && text.contains("отправлен в предложку")
    ));
    assert!(h.store.records(Table::List).is_empty());
}

#[tokio::test]
async fn test_kek_add_keeps_formatting() {
    let h = harness(settings(json!({})), FakeApi::default());
    let reply = replied(json!({
        "text": "😂 Матан <3",
        "entities": [{"type": "bold", "offset": 3, "length": 5}]
    }));

    h.dispatcher
        .feed_update(&command("/kek_add", MAIN_CHAT, 5, Some(reply)))
        .await;

    let suggestions = h.store.records(Table::Suggestions);
    assert_eq!(suggestions[0]["fields"]["Text"], "😂 <b>Матан</b> &lt;3");
}

#[tokio::test]
async fn test_kek_push_by_owner_echoes_the_entry() {
    let h = harness(settings(json!({})), FakeApi::default());

    h.dispatcher
        .feed_update(&command("/kek_push", OTHER_CHAT, OWNER, Some(replied(json!({"text": "Новый кек"})))))
        .await;

    let list = h.store.records(Table::List);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["fields"]["Text"], "Новый кек");
    assert_eq!(
        h.api.calls(),
        vec![Call::Text { chat_id: OTHER_CHAT, text: "Новый кек".to_string() }]
    );
}

#[tokio::test]
async fn test_kek_push_by_someone_else_is_ignored() {
    let h = harness(settings(json!({})), FakeApi::default());

    let outcome = h
        .dispatcher
        .feed_update(&command("/kek_push", OTHER_CHAT, 5, Some(replied(json!({"text": "kek"})))))
        .await;

    assert_eq!(outcome, Outcome::Unhandled);
    assert!(h.api.calls().is_empty());
    assert!(h.store.records(Table::List).is_empty());
}

#[tokio::test]
async fn test_kek_info_counts_types() {
    let h = harness(settings(json!({})), FakeApi::default());
    h.store.seed(Table::List, json!({"Text": "a"}));
    h.store.seed(Table::List, json!({"AttachmentType": "photo", "AttachmentFileID": "p"}));
    h.store.seed(Table::List, json!({"Text": "b"}));

    h.dispatcher.feed_update(&command("/kek_info", OTHER_CHAT, 5, None)).await;

    assert_eq!(
        h.api.calls(),
        vec![Call::Text {
            chat_id: OTHER_CHAT,
            text: texts::kek_info(3, &[("text".to_string(), 2), ("photo".to_string(), 1)]),
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn test_surprise_mutes_regular_users() {
    let h = harness(settings(json!({"surprise_chance": 100.0})), FakeApi::default());
    h.store.seed(Table::List, json!({"Text": "Test kek"}));
    let before = chrono::Utc::now().timestamp();

    h.dispatcher.feed_update(&command("/kek", MAIN_CHAT, 5, None)).await;

    let calls = h.api.calls();
    assert_eq!(calls.len(), 6, "{:?}", calls);
    assert!(matches!(&calls[0], Call::Media { kind: AttachmentKind::Animation, caption: Some(c), .. } if c == texts::SURPRISE_CAPTION));
    assert!(matches!(&calls[1], Call::Text { text, .. } if text == texts::SURPRISE_ROLL));
    let Call::Edit { text: minutes, .. } = &calls[2] else {
        panic!("expected the roll edit, got {:?}", calls[2]);
    };
    let minutes: i64 = minutes.parse().unwrap();
    assert!((1..=60).contains(&minutes));
    assert!(matches!(&calls[3], Call::Edit { text, .. } if text.contains("tg://user?id=5") && text.contains(&format!("{} мин.", minutes))));
    assert!(matches!(calls[4], Call::Delete { .. }));
    let Call::Restrict { user_id, until } = calls[5] else {
        panic!("expected a restriction, got {:?}", calls[5]);
    };
    assert_eq!(user_id, 5);
    assert!(until >= before + minutes * 60);
}

#[tokio::test(start_paused = true)]
async fn test_surprise_spares_admins() {
    let api = FakeApi {
        admins: vec![77],
        ..FakeApi::default()
    };
    let h = harness(settings(json!({"surprise_chance": 100.0})), api);
    h.store.seed(Table::List, json!({"Text": "Test kek"}));

    h.dispatcher.feed_update(&command("/kek", MAIN_CHAT, 77, None)).await;

    let calls = h.api.calls();
    assert_eq!(calls.len(), 5, "{:?}", calls);
    assert!(matches!(&calls[0], Call::Media { kind: AttachmentKind::Animation, .. }));
    assert!(matches!(&calls[1], Call::Text { text, .. } if text == texts::SURPRISE_SPARED));
    assert!(matches!(calls[2], Call::Delete { .. }));
    assert!(matches!(calls[3], Call::Delete { .. }));
    assert_eq!(calls[4], Call::Text { chat_id: MAIN_CHAT, text: "Test kek".to_string() });
    assert!(!calls.iter().any(|call| matches!(call, Call::Restrict { .. })));
}

fn inline_query(query: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": 7,
        "inline_query": {"id": "q1", "from": {"id": 5, "first_name": "Ann"}, "query": query, "offset": ""}
    }))
    .unwrap()
}

#[tokio::test]
async fn test_inline_search() {
    let h = harness(settings(json!({})), FakeApi::default());
    h.store.seed(Table::List, json!({"Text": "Матан это боль"}));
    h.store.seed(Table::List, json!({"Text": "матан", "AttachmentType": "photo", "AttachmentFileID": "p"}));
    h.store.seed(Table::List, json!({"Text": "линал"}));

    h.dispatcher.feed_update(&inline_query("МАТАН")).await;
    h.dispatcher.feed_update(&inline_query("топология")).await;

    let calls = h.api.calls();
    let Call::Inline { results } = &calls[0] else {
        panic!("expected an inline answer, got {:?}", calls[0]);
    };
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].message_text, "Матан это боль");

    let Call::Inline { results } = &calls[1] else {
        panic!("expected an inline answer, got {:?}", calls[1]);
    };
    assert_eq!(results[0].id, "not_found");
    assert_eq!(results[0].message_text, texts::inline_not_found_message("топология"));
}

#[tokio::test]
async fn test_inline_random_and_chosen() {
    let h = harness(settings(json!({})), FakeApi::default());
    h.store.seed(Table::List, json!({"Text": "единственный кек"}));

    h.dispatcher.feed_update(&inline_query("")).await;
    let chosen: Update = serde_json::from_value(json!({
        "update_id": 8,
        "chosen_inline_result": {
            "result_id": "r1",
            "from": {"id": 5, "first_name": "Ann"},
            "query": "",
            "inline_message_id": "inline-1",
        }
    }))
    .unwrap();
    h.dispatcher.feed_update(&chosen).await;

    let calls = h.api.calls();
    assert!(matches!(&calls[0], Call::Inline { results } if results[0].title == texts::INLINE_RANDOM_TITLE));
    assert_eq!(
        calls[1],
        Call::Edit {
            target: EditTarget::Inline("inline-1".to_string()),
            text: "единственный кек".to_string(),
        }
    );
}
