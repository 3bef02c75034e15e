//! Logical tables of the kek base.

/// Tables the bot reads and writes.
///
/// The display form is the table name used by the remote API.
///
/// # Examples
///
/// ```
/// use algebrach_storage::Table;
///
/// assert_eq!(Table::List.to_string(), "List");
/// assert_eq!(Table::Suggestions.as_ref(), "Suggestions");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
)]
pub enum Table {
    /// Published keks
    List,
    /// Telegram users that authored or suggested keks
    Users,
    /// Keks waiting for moderation
    Suggestions,
}
