//! Message entities and their rendering back into HTML parse mode.
//!
//! Entity offsets and lengths count UTF-16 code units, so rendering works on
//! the UTF-16 encoding of the text and decodes each slice back to UTF-8.

use super::models::{User, escape_html};
use serde::{Deserialize, Serialize};

/// Formatting kind of a [`MessageEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// `<b>`
    Bold,
    /// `<i>`
    Italic,
    /// `<u>`
    Underline,
    /// `<s>`
    Strikethrough,
    /// `<tg-spoiler>`
    Spoiler,
    /// Inline `<code>`
    Code,
    /// `<pre>` block, optionally with a language
    Pre,
    /// Link with custom text
    TextLink,
    /// Mention of a user without a username
    TextMention,
    /// `<blockquote>`
    Blockquote,
    /// Collapsed `<blockquote>`
    ExpandableBlockquote,
    /// Custom emoji sticker
    CustomEmoji,
    /// Mentions, hashtags, plain URLs and other entities Telegram detects on
    /// its own; they render as plain text.
    #[serde(other)]
    Other,
}

/// A formatted span of a message text or caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    /// Formatting kind
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Start, in UTF-16 code units
    pub offset: usize,
    /// Length, in UTF-16 code units
    pub length: usize,
    /// Target of a `text_link`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Mentioned user of a `text_mention`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Language of a `pre` block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Sticker id of a `custom_emoji`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_emoji_id: Option<String>,
}

impl MessageEntity {
    fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    fn wrap(&self, inner: &str) -> String {
        match self.kind {
            EntityKind::Bold => format!("<b>{}</b>", inner),
            EntityKind::Italic => format!("<i>{}</i>", inner),
            EntityKind::Underline => format!("<u>{}</u>", inner),
            EntityKind::Strikethrough => format!("<s>{}</s>", inner),
            EntityKind::Spoiler => format!("<tg-spoiler>{}</tg-spoiler>", inner),
            EntityKind::Code => format!("<code>{}</code>", inner),
            EntityKind::Pre => match &self.language {
                Some(language) => format!(
                    "<pre><code class=\"language-{}\">{}</code></pre>",
                    escape_attribute(language),
                    inner
                ),
                None => format!("<pre>{}</pre>", inner),
            },
            EntityKind::TextLink => match &self.url {
                Some(url) => format!("<a href=\"{}\">{}</a>", escape_attribute(url), inner),
                None => inner.to_string(),
            },
            EntityKind::TextMention => match &self.user {
                Some(user) => format!("<a href=\"tg://user?id={}\">{}</a>", user.id, inner),
                None => inner.to_string(),
            },
            EntityKind::Blockquote => format!("<blockquote>{}</blockquote>", inner),
            EntityKind::ExpandableBlockquote => {
                format!("<blockquote expandable>{}</blockquote>", inner)
            }
            EntityKind::CustomEmoji => match &self.custom_emoji_id {
                Some(id) => format!(
                    "<tg-emoji emoji-id=\"{}\">{}</tg-emoji>",
                    escape_attribute(id),
                    inner
                ),
                None => inner.to_string(),
            },
            EntityKind::Other => inner.to_string(),
        }
    }
}

/// Render `text` with its entities as HTML parse-mode markup.
///
/// Text outside tags is escaped. Entities nest when one lies inside another;
/// an entity crossing the end of its enclosing one is cut at that end.
pub fn render_html(text: &str, entities: &[MessageEntity]) -> String {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut sorted: Vec<&MessageEntity> = entities.iter().filter(|e| e.length > 0).collect();
    sorted.sort_by(|a, b| a.offset.cmp(&b.offset).then(b.length.cmp(&a.length)));
    render_span(&units, &sorted, 0, units.len())
}

fn render_span(units: &[u16], entities: &[&MessageEntity], start: usize, end: usize) -> String {
    let mut html = String::new();
    let mut pos = start;
    let mut rest = entities;

    while let Some((entity, tail)) = rest.split_first() {
        if entity.offset < pos || entity.offset >= end {
            rest = tail;
            continue;
        }
        let entity_end = entity.end().min(end);
        let nested = tail.iter().take_while(|e| e.offset < entity_end).count();
        let (inner, after) = tail.split_at(nested);

        html.push_str(&escape_units(&units[pos..entity.offset]));
        html.push_str(&entity.wrap(&render_span(units, inner, entity.offset, entity_end)));
        pos = entity_end;
        rest = after;
    }

    html.push_str(&escape_units(&units[pos..end]));
    html
}

fn escape_units(units: &[u16]) -> String {
    escape_html(&String::from_utf16_lossy(units))
}

fn escape_attribute(value: &str) -> String {
    escape_html(value).replace('"', "&quot;")
}
