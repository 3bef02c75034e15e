//! In-process record store for development and tests.

use crate::{Fields, RecordStore, Table};
use algebrach_error::{StorageError, StorageErrorKind, StorageResult};
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Record store kept entirely in memory.
///
/// Mirrors the remote store's behavior closely enough for handlers: records
/// carry generated `rec…` ids and a creation time, updates merge fields,
/// and upserts match on the given key fields.
///
/// # Examples
///
/// ```
/// use algebrach_storage::{InMemoryRecordStore, RecordStore, Table};
/// use serde_json::json;
///
/// let store = InMemoryRecordStore::new();
/// store.seed(Table::List, json!({"Text": "Test kek"}));
/// let records = store.list(Table::List).unwrap();
/// assert_eq!(records[0]["fields"]["Text"], "Test kek");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    next_id: Mutex<u64>,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record built from a JSON object of fields and return its id.
    ///
    /// Non-object values are stored as an empty field map.
    pub fn seed(&self, table: Table, fields: Value) -> String {
        let fields = match fields {
            Value::Object(fields) => fields,
            _ => Fields::new(),
        };
        let record = self.new_record(fields);
        let id = record["id"].as_str().unwrap_or_default().to_string();
        self.tables.lock().entry(table).or_default().push(record);
        id
    }

    /// Snapshot of every record in `table`.
    pub fn records(&self, table: Table) -> Vec<Value> {
        self.tables.lock().get(&table).cloned().unwrap_or_default()
    }

    fn new_record(&self, fields: Fields) -> Value {
        let id = {
            let mut next_id = self.next_id.lock();
            *next_id += 1;
            format!("rec{:014}", *next_id)
        };
        json!({
            "id": id,
            "createdTime": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "fields": fields,
        })
    }
}

fn merge(record: &mut Value, fields: Fields) {
    if let Some(existing) = record.get_mut("fields").and_then(Value::as_object_mut) {
        existing.extend(fields);
    }
}

fn matches_key(record: &Value, row: &Fields, key_fields: &[&str]) -> bool {
    key_fields.iter().all(|key| {
        let stored = record.get("fields").and_then(|fields| fields.get(*key));
        stored.is_some() && stored == row.get(*key)
    })
}

impl RecordStore for InMemoryRecordStore {
    fn list(&self, table: Table) -> StorageResult<Vec<Value>> {
        Ok(self.records(table))
    }

    fn create(&self, table: Table, fields: Fields) -> StorageResult<Value> {
        let record = self.new_record(fields);
        self.tables
            .lock()
            .entry(table)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn update(&self, table: Table, id: &str, fields: Fields) -> StorageResult<Value> {
        let mut tables = self.tables.lock();
        let record = tables
            .get_mut(&table)
            .and_then(|records| records.iter_mut().find(|record| record["id"] == id))
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::RemoteRejected(format!(
                    "NOT_FOUND: no record {} in {}",
                    id, table
                )))
            })?;
        merge(record, fields);
        Ok(record.clone())
    }

    fn upsert(&self, table: Table, rows: Vec<Fields>, key_fields: &[&str]) -> StorageResult<Vec<Value>> {
        if key_fields.is_empty() {
            return Err(StorageError::new(StorageErrorKind::MalformedInput(
                "upsert needs at least one key field".to_string(),
            )));
        }

        let mut upserted = Vec::with_capacity(rows.len());
        for row in rows {
            let existing = {
                let mut tables = self.tables.lock();
                let records = tables.entry(table).or_default();
                records
                    .iter_mut()
                    .find(|record| matches_key(record, &row, key_fields))
                    .map(|record| {
                        merge(record, row.clone());
                        record.clone()
                    })
            };
            match existing {
                Some(record) => upserted.push(record),
                None => upserted.push(self.create(table, row)?),
            }
        }
        Ok(upserted)
    }
}
