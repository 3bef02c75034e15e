//! `/kek_info`: size of the base by attachment type.

use crate::texts;
use algebrach_error::AlgebrachResult;
use algebrach_social::{EventContext, Handler, Message, ReplyTarget};
use algebrach_storage::{KekRecord, KekStorage};
use async_trait::async_trait;
use std::sync::Arc;

/// Attachment type counts, `text` for plain keks, most common first.
///
/// Types with equal counts keep the order they were first seen in.
pub fn count_by_type(records: &[KekRecord]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in records {
        let kind = record.fields.attachment_type.as_deref().unwrap_or("text");
        match counts.iter_mut().find(|(seen, _)| seen == kind) {
            Some((_, count)) => *count += 1,
            None => counts.push((kind.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Reports how many keks there are.
pub struct KekInfo {
    storage: Arc<KekStorage>,
}

impl KekInfo {
    /// Handler reading from `storage`.
    pub fn new(storage: Arc<KekStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Handler<Message> for KekInfo {
    async fn handle(&self, message: &Message, ctx: &EventContext) -> AlgebrachResult<()> {
        let records = self.storage.list_records().await?;
        let text = texts::kek_info(records.len(), &count_by_type(&records));
        ctx.api
            .send_text(ReplyTarget::reply_to(message), &text)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, kind: Option<&str>) -> KekRecord {
        serde_json::from_value(json!({
            "id": id,
            "fields": {"Text": "kek", "AttachmentType": kind},
        }))
        .unwrap()
    }

    #[test]
    fn test_count_by_type_most_common_first() {
        let records = vec![
            record("rec1", Some("photo")),
            record("rec2", None),
            record("rec3", None),
            record("rec4", Some("sticker")),
            record("rec5", Some("photo")),
            record("rec6", None),
        ];

        assert_eq!(
            count_by_type(&records),
            vec![
                ("text".to_string(), 3),
                ("photo".to_string(), 2),
                ("sticker".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_info_text() {
        let text = texts::kek_info(3, &[("text".to_string(), 2), ("photo".to_string(), 1)]);
        assert_eq!(
            text,
            "<b>Всего кеков в базе:</b> 3\n\n<b>По типу:</b>\n• text: 2\n• photo: 1"
        );
    }
}
