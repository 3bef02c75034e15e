//! Error types for the algebrach workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use algebrach_error::{AlgebrachResult, StorageError, StorageErrorKind};
//!
//! fn fetch_keks() -> AlgebrachResult<Vec<String>> {
//!     Err(StorageError::new(StorageErrorKind::Timeout))?
//! }
//!
//! match fetch_keks() {
//!     Ok(keks) => println!("Got {} keks", keks.len()),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod storage;
mod telegram;

pub use config::ConfigError;
pub use error::{AlgebrachError, AlgebrachErrorKind, AlgebrachResult};
pub use http::HttpError;
pub use storage::{RetryableError, StorageError, StorageErrorKind, StorageResult};
pub use telegram::{TelegramError, TelegramErrorKind, TelegramResult};
