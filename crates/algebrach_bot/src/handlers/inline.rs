//! Inline mode: `@bot` from any chat sends keks.

use crate::texts;
use algebrach_error::AlgebrachResult;
use algebrach_social::{ChosenInlineResult, EditTarget, EventContext, Handler, InlineArticle, InlineQuery, one_liner};
use algebrach_storage::{KekRecord, KekStorage};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::debug;

/// Seconds Telegram may cache inline answers.
pub const CACHE_TIME: u32 = 5 * 60;

/// Most results a search returns.
pub const SEARCH_LIMIT: usize = 10;

fn text_keks(records: &[KekRecord]) -> impl Iterator<Item = (&KekRecord, &str)> + '_ {
    records.iter().filter_map(|record| match &record.fields.text {
        Some(text) if !text.is_empty() && record.fields.is_text_only() => Some((record, text.as_str())),
        _ => None,
    })
}

/// Text-only keks containing `query`, ignoring case, at most `limit` of them.
pub fn search_text_keks<'a>(records: &'a [KekRecord], query: &str, limit: usize) -> Vec<&'a KekRecord> {
    let query = query.to_lowercase();
    text_keks(records)
        .filter(|(_, text)| text.to_lowercase().contains(&query))
        .map(|(record, _)| record)
        .take(limit)
        .collect()
}

/// Article sending `record`'s text, previewed in title and description.
fn article(record: &KekRecord) -> InlineArticle {
    let text = record.fields.text.clone().unwrap_or_default();
    let preview: Vec<char> = one_liner(&text, Some(100)).chars().collect();
    let title: String = preview.iter().take(50).collect();
    let description = (preview.len() > 50).then(|| preview[50..].iter().collect());

    InlineArticle {
        id: record.id.clone(),
        title: if title.is_empty() {
            texts::INLINE_DEFAULT_TITLE.to_string()
        } else {
            title
        },
        description,
        message_text: text,
    }
}

/// Empty query: offers a random kek, filled in once chosen.
#[derive(Debug, Default)]
pub struct InlineRandomKek;

#[async_trait]
impl Handler<InlineQuery> for InlineRandomKek {
    async fn handle(&self, query: &InlineQuery, ctx: &EventContext) -> AlgebrachResult<()> {
        let result = InlineArticle {
            id: uuid::Uuid::new_v4().to_string(),
            title: texts::INLINE_RANDOM_TITLE.to_string(),
            description: Some(texts::INLINE_RANDOM_DESCRIPTION.to_string()),
            message_text: texts::INLINE_RANDOM_PLACEHOLDER.to_string(),
        };
        ctx.api
            .answer_inline_query(&query.id, vec![result], CACHE_TIME, false)
            .await?;
        Ok(())
    }
}

/// Non-empty query: text keks containing it.
pub struct InlineSearch {
    storage: Arc<KekStorage>,
}

impl InlineSearch {
    /// Handler reading from `storage`.
    pub fn new(storage: Arc<KekStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Handler<InlineQuery> for InlineSearch {
    async fn handle(&self, query: &InlineQuery, ctx: &EventContext) -> AlgebrachResult<()> {
        let records = self.storage.list_records().await?;
        let matches = search_text_keks(&records, &query.query, SEARCH_LIMIT);
        debug!(query = %query.query, found = matches.len(), "Inline search");

        let results = if matches.is_empty() {
            vec![InlineArticle {
                id: "not_found".to_string(),
                title: texts::INLINE_NOT_FOUND_TITLE.to_string(),
                description: Some(texts::inline_not_found_description(&query.query)),
                message_text: texts::inline_not_found_message(&query.query),
            }]
        } else {
            matches.into_iter().map(article).collect()
        };
        ctx.api
            .answer_inline_query(&query.id, results, CACHE_TIME, false)
            .await?;
        Ok(())
    }
}

/// Replaces the random kek placeholder with an actual text kek.
pub struct ChosenRandomKek {
    storage: Arc<KekStorage>,
}

impl ChosenRandomKek {
    /// Handler reading from `storage`.
    pub fn new(storage: Arc<KekStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Handler<ChosenInlineResult> for ChosenRandomKek {
    async fn handle(&self, chosen: &ChosenInlineResult, ctx: &EventContext) -> AlgebrachResult<()> {
        let Some(inline_message_id) = &chosen.inline_message_id else {
            return Ok(());
        };

        let records = self.storage.list_records().await?;
        let candidates: Vec<&str> = text_keks(&records).map(|(_, text)| text).collect();
        let picked = candidates.choose(&mut rand::thread_rng()).copied();
        let text = picked.unwrap_or(texts::INLINE_EMPTY);

        ctx.api
            .edit_text(EditTarget::Inline(inline_message_id.clone()), text)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, text: &str, kind: Option<&str>) -> KekRecord {
        serde_json::from_value(json!({
            "id": id,
            "fields": {"Text": text, "AttachmentType": kind},
        }))
        .unwrap()
    }

    #[test]
    fn test_search_skips_attachments_and_ignores_case() {
        let records = vec![
            record("rec1", "Матан это боль", None),
            record("rec2", "матан с картинкой", Some("photo")),
            record("rec3", "линал", None),
            record("rec4", "МАТАН снова", None),
        ];

        let found: Vec<&str> = search_text_keks(&records, "матан", SEARCH_LIMIT)
            .into_iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(found, vec!["rec1", "rec4"]);
    }

    #[test]
    fn test_search_respects_limit() {
        let records: Vec<KekRecord> = (0..15)
            .map(|i| record(&format!("rec{}", i), "kek", None))
            .collect();
        assert_eq!(search_text_keks(&records, "KEK", SEARCH_LIMIT).len(), SEARCH_LIMIT);
    }

    #[test]
    fn test_article_preview_split() {
        let long = "a".repeat(120);
        let item = article(&record("rec1", &long, None));
        assert_eq!(item.title.chars().count(), 50);
        assert_eq!(item.description.as_deref().map(|d| d.chars().count()), Some(50));
        assert_eq!(item.message_text, long);

        let short = article(&record("rec2", "short\nkek", None));
        assert_eq!(short.title, "short kek");
        assert_eq!(short.description, None);
    }
}
