//! Chat platform error types.

/// Kinds of Telegram Bot API failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TelegramErrorKind {
    /// The API answered 400, e.g. a stale or foreign file id
    #[display("Bad request: {}", _0)]
    BadRequest(String),
    /// Any other unsuccessful API answer
    #[display("API error {}: {}", code, description)]
    Api {
        /// Error code reported by the API
        code: i64,
        /// Human readable description reported by the API
        description: String,
    },
    /// The request never got an answer
    #[display("Transport failure: {}", _0)]
    Transport(String),
    /// The answer could not be decoded
    #[display("Decode failure: {}", _0)]
    Decode(String),
}

/// Telegram error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Telegram Error: {} at line {} in {}", kind, line, file)]
pub struct TelegramError {
    /// The kind of error that occurred
    pub kind: TelegramErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TelegramError {
    /// Create a new TelegramError with automatic location tracking.
    ///
    /// # Example
    /// ```
    /// use algebrach_error::{TelegramError, TelegramErrorKind};
    ///
    /// let err = TelegramError::new(TelegramErrorKind::BadRequest("wrong file identifier".into()));
    /// assert!(err.is_bad_request());
    /// ```
    #[track_caller]
    pub fn new(kind: TelegramErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TelegramErrorKind {
        &self.kind
    }

    /// Whether the API rejected the request as malformed.
    pub fn is_bad_request(&self) -> bool {
        matches!(self.kind, TelegramErrorKind::BadRequest(_))
    }
}

/// Result type for Telegram operations.
pub type TelegramResult<T> = Result<T, TelegramError>;
