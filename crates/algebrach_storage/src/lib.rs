//! Kek record store access for algebrach.
//!
//! The record store is a spreadsheet-like remote backend with three tables
//! ([`Table::List`], [`Table::Users`], [`Table::Suggestions`]) reached through
//! the synchronous [`RecordStore`] trait. [`KekStorage`] is what handlers use:
//! it runs store calls on the blocking bridge, retries transient failures with
//! backoff and caches the two list reads for a fixed TTL.
//!
//! # Example
//!
//! ```rust,no_run
//! use algebrach_storage::{InMemoryRecordStore, KekStorage, KekStorageConfig};
//! use std::sync::Arc;
//!
//! # async fn demo() -> algebrach_error::StorageResult<()> {
//! let storage = KekStorage::new(Arc::new(InMemoryRecordStore::new()), KekStorageConfig::default());
//! let keks = storage.list_records().await?;
//! println!("{} keks available", keks.len());
//! storage.shutdown(true).await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod airtable;
mod kek_storage;
mod memory;
mod models;
mod retry;
mod store;
mod table;

pub use airtable::{AIRTABLE_API_URL, AirtableClient};
pub use kek_storage::{KekStorage, KekStorageConfig};
pub use memory::InMemoryRecordStore;
pub use models::{
    Actor, AirtableAttachment, KekFields, KekRecord, NewKek, UserFields, UserRecord,
};
pub use retry::RetryPolicy;
pub use store::{Fields, RecordStore};
pub use table::Table;
