//! Record store error types.

/// Kinds of record store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// The blocking call did not finish in time, or retries were exhausted on timeouts
    #[display("Record store call timed out")]
    Timeout,
    /// The remote store refused the request; retrying will not help
    #[display("Record store rejected the request: {}", _0)]
    RemoteRejected(String),
    /// Arguments were invalid before anything was sent
    #[display("Malformed input: {}", _0)]
    MalformedInput(String),
    /// Network or server-side failure that may succeed on retry
    #[display("Record store transport failure: {}", _0)]
    Transport(String),
    /// The worker pool stayed unusable after being recreated
    #[display("Worker pool is broken")]
    WorkerPoolBroken,
}

impl StorageErrorKind {
    /// Whether the retry layer should attempt this call again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorageErrorKind::Timeout
                | StorageErrorKind::Transport(_)
                | StorageErrorKind::WorkerPoolBroken
        )
    }
}

/// Record store error with location tracking.
///
/// # Examples
///
/// ```
/// use algebrach_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::RemoteRejected("422 INVALID_REQUEST".to_string()));
/// assert!(format!("{}", err).contains("rejected"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StorageErrorKind {
        &self.kind
    }
}

/// Errors that can tell a retry loop whether another attempt is worthwhile.
///
/// # Examples
///
/// ```
/// use algebrach_error::{RetryableError, StorageError, StorageErrorKind};
///
/// assert!(StorageError::new(StorageErrorKind::Timeout).is_retryable());
/// assert!(!StorageError::new(StorageErrorKind::MalformedInput("empty id".into())).is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for StorageError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Result type for record store operations.
pub type StorageResult<T> = Result<T, StorageError>;
