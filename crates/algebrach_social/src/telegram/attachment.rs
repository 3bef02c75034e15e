//! Attachment kinds carried by keks and messages.

use crate::Message;
use std::str::FromStr;

/// Media kinds the bot can send and store.
///
/// The string form is the name stored in the record store and the suffix of
/// the matching Bot API send method.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum AttachmentKind {
    /// Photo
    Photo,
    /// Music file
    Audio,
    /// Voice note
    Voice,
    /// Sticker
    Sticker,
    /// Video
    Video,
    /// Round video note
    VideoNote,
    /// GIF or silent video
    Animation,
    /// General file
    Document,
}

impl AttachmentKind {
    /// Bot API method sending this kind, e.g. `sendVideoNote`.
    pub fn send_method(&self) -> &'static str {
        match self {
            AttachmentKind::Photo => "sendPhoto",
            AttachmentKind::Audio => "sendAudio",
            AttachmentKind::Voice => "sendVoice",
            AttachmentKind::Sticker => "sendSticker",
            AttachmentKind::Video => "sendVideo",
            AttachmentKind::VideoNote => "sendVideoNote",
            AttachmentKind::Animation => "sendAnimation",
            AttachmentKind::Document => "sendDocument",
        }
    }

    /// Whether the send method accepts a caption.
    pub fn accepts_caption(&self) -> bool {
        !matches!(self, AttachmentKind::Sticker | AttachmentKind::VideoNote)
    }
}

/// A reference to a file the bot can resend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Telegram file id
    pub file_id: String,
    /// Original filename
    pub filename: Option<String>,
}

/// What a message carries besides text.
///
/// # Examples
///
/// ```
/// use algebrach_social::{Attachment, AttachmentKind};
///
/// let stored = Attachment::from_stored(Some("photo"), Some("photo_id_123"));
/// assert_eq!(stored.kind(), Some(AttachmentKind::Photo));
/// assert_eq!(stored.file_id(), Some("photo_id_123"));
///
/// assert_eq!(Attachment::from_stored(None, None), Attachment::None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// A file of the given kind
    File {
        /// Media kind
        kind: AttachmentKind,
        /// The file
        file: FileRef,
    },
    /// Plain text
    None,
}

impl Attachment {
    /// Attachment of `message`; for photos the largest size is used.
    pub fn from_message(message: &Message) -> Self {
        let file = |kind, file_id: &str, filename: Option<&String>| Attachment::File {
            kind,
            file: FileRef {
                file_id: file_id.to_string(),
                filename: filename.cloned(),
            },
        };

        if let Some(largest) = message.photo.as_ref().and_then(|sizes| sizes.last()) {
            return file(AttachmentKind::Photo, &largest.file_id, None);
        }

        let candidates = [
            (AttachmentKind::Audio, &message.audio, true),
            (AttachmentKind::Voice, &message.voice, false),
            (AttachmentKind::Sticker, &message.sticker, false),
            (AttachmentKind::Video, &message.video, true),
            (AttachmentKind::VideoNote, &message.video_note, false),
            (AttachmentKind::Animation, &message.animation, true),
            (AttachmentKind::Document, &message.document, true),
        ];
        candidates
            .into_iter()
            .find_map(|(kind, object, keeps_name)| {
                object.as_ref().map(|object| {
                    let filename = if keeps_name { object.file_name.as_ref() } else { None };
                    file(kind, &object.file_id, filename)
                })
            })
            .unwrap_or(Attachment::None)
    }

    /// Attachment described by a stored kind name and file id.
    ///
    /// Unknown kinds and kinds without a file id degrade to [`Attachment::None`].
    pub fn from_stored(kind: Option<&str>, file_id: Option<&str>) -> Self {
        match (kind.map(AttachmentKind::from_str), file_id) {
            (Some(Ok(kind)), Some(file_id)) if !file_id.is_empty() => Attachment::File {
                kind,
                file: FileRef {
                    file_id: file_id.to_string(),
                    filename: None,
                },
            },
            _ => Attachment::None,
        }
    }

    /// Media kind, `None` for plain text.
    pub fn kind(&self) -> Option<AttachmentKind> {
        match self {
            Attachment::File { kind, .. } => Some(*kind),
            Attachment::None => None,
        }
    }

    /// File id, `None` for plain text.
    pub fn file_id(&self) -> Option<&str> {
        match self {
            Attachment::File { file, .. } => Some(&file.file_id),
            Attachment::None => None,
        }
    }

    /// Original filename, if known.
    pub fn filename(&self) -> Option<&str> {
        match self {
            Attachment::File { file, .. } => file.filename.as_deref(),
            Attachment::None => None,
        }
    }
}
