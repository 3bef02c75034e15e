//! Synchronous record store interface.

use crate::Table;
use algebrach_error::StorageResult;

/// Field map of a single record, keyed by remote field name.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Narrow CRUD interface over the remote record store.
///
/// Calls block the current thread and are only ever made from bridge workers.
/// Records come back in the store's wire shape:
/// `{"id": "rec…", "createdTime": "…", "fields": {…}}`.
pub trait RecordStore: Send + Sync + 'static {
    /// Fetch every record of `table`.
    fn list(&self, table: Table) -> StorageResult<Vec<serde_json::Value>>;

    /// Create one record and return it.
    fn create(&self, table: Table, fields: Fields) -> StorageResult<serde_json::Value>;

    /// Merge `fields` into the record `id` and return it.
    fn update(&self, table: Table, id: &str, fields: Fields) -> StorageResult<serde_json::Value>;

    /// Create or update records matched on `key_fields`, returning them in input order.
    fn upsert(
        &self,
        table: Table,
        rows: Vec<Fields>,
        key_fields: &[&str],
    ) -> StorageResult<Vec<serde_json::Value>>;
}
