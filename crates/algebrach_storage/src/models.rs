//! Typed views of kek base records and write payloads.

use crate::Fields;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// File attached to a record, as the store reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirtableAttachment {
    /// Download URL
    pub url: String,
    /// Original filename
    #[serde(default)]
    pub filename: Option<String>,
    /// Attachment id assigned by the store
    #[serde(default)]
    pub id: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub size: Option<u64>,
    /// MIME type
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
}

/// Fields of a kek.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KekFields {
    /// Message text or attachment caption
    #[serde(default, rename = "Text")]
    pub text: Option<String>,
    /// Attachment kind (`photo`, `voice`, …); absent for text-only keks
    #[serde(default, rename = "AttachmentType")]
    pub attachment_type: Option<String>,
    /// Telegram file id of the attachment
    #[serde(default, rename = "AttachmentFileID")]
    pub attachment_file_id: Option<String>,
    /// Stored copies of the attachment
    #[serde(default, rename = "Attachment")]
    pub attachment: Option<Vec<AirtableAttachment>>,
    /// Record ids of the authors
    #[serde(default, rename = "Author")]
    pub author: Vec<String>,
    /// Record ids of whoever suggested it
    #[serde(default, rename = "Suggestor")]
    pub suggestor: Option<Vec<String>>,
}

impl KekFields {
    /// Whether the kek has no attachment.
    pub fn is_text_only(&self) -> bool {
        self.attachment_type.is_none()
    }

    /// URL of the first stored attachment copy.
    pub fn attachment_url(&self) -> Option<&str> {
        self.attachment
            .as_deref()
            .and_then(|files| files.first())
            .map(|file| file.url.as_str())
    }
}

/// A kek as stored in [`crate::Table::List`].
///
/// # Examples
///
/// ```
/// use algebrach_storage::KekRecord;
///
/// let record: KekRecord = serde_json::from_value(serde_json::json!({
///     "id": "rec1",
///     "fields": {"Text": "Test kek"}
/// })).unwrap();
/// assert_eq!(record.fields.text.as_deref(), Some("Test kek"));
/// assert!(record.fields.is_text_only());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KekRecord {
    /// Record id
    pub id: String,
    /// Record fields
    pub fields: KekFields,
    /// Creation timestamp reported by the store
    #[serde(default, rename = "createdTime")]
    pub created_time: Option<String>,
}

/// Fields of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFields {
    /// Telegram user id, the natural key
    #[serde(rename = "TelegramID")]
    pub telegram_id: i64,
    /// Full name
    #[serde(rename = "Name")]
    pub name: String,
    /// Username without `@`
    #[serde(default, rename = "Username")]
    pub username: Option<String>,
    /// IETF language tag
    #[serde(default, rename = "LanguageCode")]
    pub language_code: Option<String>,
    /// Rollup count of authored keks
    #[serde(default, rename = "AuthoredKeks")]
    pub authored_keks: Option<i64>,
    /// Rollup count of suggested keks
    #[serde(default, rename = "SuggestedKeks")]
    pub suggested_keks: Option<i64>,
}

/// A user as stored in [`crate::Table::Users`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Record id
    pub id: String,
    /// Record fields
    pub fields: UserFields,
    /// Creation timestamp reported by the store
    #[serde(default, rename = "createdTime")]
    pub created_time: Option<String>,
}

/// A person involved in a kek, upserted into the users table by Telegram id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Telegram user id
    pub telegram_id: i64,
    /// Full name
    pub name: String,
    /// Username without `@`
    pub username: Option<String>,
    /// IETF language tag
    pub language_code: Option<String>,
}

impl Actor {
    /// Users-table row for this actor.
    pub(crate) fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("TelegramID".into(), json!(self.telegram_id));
        fields.insert("Name".into(), json!(self.name));
        fields.insert("Username".into(), json!(self.username));
        fields.insert("LanguageCode".into(), json!(self.language_code));
        fields
    }
}

/// Content of a kek about to be written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewKek {
    /// Message text or caption
    pub text: Option<String>,
    /// Attachment kind, `None` for text-only
    pub attachment_type: Option<String>,
    /// Telegram file id of the attachment
    pub attachment_file_id: Option<String>,
    /// Original filename of the attachment
    pub attachment_filename: Option<String>,
    /// Public URL the store can copy the attachment from
    pub attachment_url: Option<String>,
}

impl NewKek {
    /// A text-only kek.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// List or suggestions row referencing the upserted actors.
    pub(crate) fn to_fields(&self, author_id: &str, suggestor_id: Option<&str>) -> Fields {
        let mut fields = Fields::new();
        fields.insert("Text".into(), json!(self.text));
        fields.insert("AttachmentType".into(), json!(self.attachment_type));
        fields.insert("AttachmentFileID".into(), json!(self.attachment_file_id));
        fields.insert("Author".into(), json!([author_id]));
        if let Some(url) = &self.attachment_url {
            fields.insert(
                "Attachment".into(),
                json!([{"url": url, "filename": self.attachment_filename}]),
            );
        }
        if let Some(suggestor_id) = suggestor_id {
            fields.insert("Suggestor".into(), json!([suggestor_id]));
        }
        fields
    }
}

/// Record id of a raw store record.
pub(crate) fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}
