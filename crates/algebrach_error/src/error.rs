//! Top-level error wrapper types.

use crate::{ConfigError, HttpError, StorageError, TelegramError};

/// Every error an algebrach component can surface.
///
/// # Examples
///
/// ```
/// use algebrach_error::{AlgebrachError, ConfigError};
///
/// let err: AlgebrachError = ConfigError::new("environment must be dev, test or prod").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum AlgebrachErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// HTTP listener error
    #[from(HttpError)]
    Http(HttpError),
    /// Record store error
    #[from(StorageError)]
    Storage(StorageError),
    /// Chat platform error
    #[from(TelegramError)]
    Telegram(TelegramError),
}

/// Algebrach error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Algebrach Error: {}", _0)]
pub struct AlgebrachError(Box<AlgebrachErrorKind>);

impl AlgebrachError {
    /// Create a new error from a kind.
    pub fn new(kind: AlgebrachErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &AlgebrachErrorKind {
        &self.0
    }

    /// The storage error inside, if this is one.
    pub fn as_storage(&self) -> Option<&StorageError> {
        match self.kind() {
            AlgebrachErrorKind::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl<T> From<T> for AlgebrachError
where
    T: Into<AlgebrachErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for algebrach operations.
pub type AlgebrachResult<T> = std::result::Result<T, AlgebrachError>;
