//! Blocking client for the Airtable REST API.

use crate::{Fields, RecordStore, Table};
use algebrach_error::{StorageError, StorageErrorKind, StorageResult};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{Value, json};
use std::sync::OnceLock;
use std::time::Duration;
use tokio_retry2::strategy::ExponentialBackoff;
use tracing::{debug, instrument, warn};

/// Public Airtable API root.
pub const AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const LOW_LEVEL_RETRIES: usize = 2;
const LOW_LEVEL_MAX_DELAY: Duration = Duration::from_secs(1);

/// [`RecordStore`] backed by one Airtable base.
///
/// Requests time out after 3s to connect and 5s overall, and are retried
/// twice on rate limiting, server errors and network failures before the
/// error is handed up. The HTTP client is built on first use so that it is
/// created on a worker thread rather than inside the async runtime.
pub struct AirtableClient {
    access_token: String,
    base_id: String,
    api_url: String,
    http: OnceLock<Client>,
}

impl AirtableClient {
    /// Client for `base_id` authenticated with a personal access token.
    pub fn new(access_token: impl Into<String>, base_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_id: base_id.into(),
            api_url: AIRTABLE_API_URL.to_string(),
            http: OnceLock::new(),
        }
    }

    /// Point the client at another API root.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// The base this client talks to.
    pub fn base_id(&self) -> &str {
        &self.base_id
    }

    fn http(&self) -> StorageResult<&Client> {
        if let Some(client) = self.http.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                StorageError::new(StorageErrorKind::Transport(format!(
                    "Failed to build HTTP client: {}",
                    e
                )))
            })?;
        Ok(self.http.get_or_init(|| client))
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}/{}", self.api_url, self.base_id, table)
    }

    /// Send the request built by `build`, retrying transient failures.
    ///
    /// Runs on a bridge worker thread, so the backoff sleeps the thread.
    fn send(&self, build: impl Fn(&Client) -> RequestBuilder) -> StorageResult<Value> {
        let http = self.http()?;
        let mut delays = low_level_delays().enumerate();
        loop {
            let outcome = build(http).bearer_auth(&self.access_token).send();
            let retryable = match &outcome {
                Ok(response) => {
                    let status = response.status();
                    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
                }
                Err(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            };
            let next = if retryable { delays.next() } else { None };
            let Some((attempt, delay)) = next else {
                return Self::into_json(outcome);
            };

            warn!(
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "Retrying Airtable request"
            );
            std::thread::sleep(delay);
        }
    }

    fn into_json(outcome: reqwest::Result<reqwest::blocking::Response>) -> StorageResult<Value> {
        let response = outcome.map_err(|e| {
            StorageError::new(StorageErrorKind::Transport(format!("Airtable request failed: {}", e)))
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<Value>().map_err(|e| {
                StorageError::new(StorageErrorKind::RemoteRejected(format!(
                    "Unreadable Airtable response: {}",
                    e
                )))
            });
        }

        let body = response.text().unwrap_or_default();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Err(StorageError::new(StorageErrorKind::Transport(format!(
                "Airtable returned {}",
                status
            ))))
        } else {
            Err(StorageError::new(StorageErrorKind::RemoteRejected(format!(
                "Airtable returned {}: {}",
                status, body
            ))))
        }
    }
}

/// Delays between low-level attempts: 100ms, then 200ms.
fn low_level_delays() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(50)
        .max_delay(LOW_LEVEL_MAX_DELAY)
        .take(LOW_LEVEL_RETRIES)
}

fn take_records(mut body: Value) -> Vec<Value> {
    match body.get_mut("records").map(Value::take) {
        Some(Value::Array(records)) => records,
        _ => Vec::new(),
    }
}

impl RecordStore for AirtableClient {
    #[instrument(skip(self), fields(base = %self.base_id))]
    fn list(&self, table: Table) -> StorageResult<Vec<Value>> {
        let url = self.table_url(table);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let page = self.send(|http| {
                let request = http.get(&url);
                match &offset {
                    Some(offset) => request.query(&[("offset", offset)]),
                    None => request,
                }
            })?;
            offset = page.get("offset").and_then(Value::as_str).map(str::to_string);
            records.extend(take_records(page));
            if offset.is_none() {
                break;
            }
        }

        debug!(count = records.len(), "Listed Airtable records");
        Ok(records)
    }

    #[instrument(skip(self, fields), fields(base = %self.base_id))]
    fn create(&self, table: Table, fields: Fields) -> StorageResult<Value> {
        let url = self.table_url(table);
        let body = json!({ "fields": fields });
        self.send(|http| http.post(&url).json(&body))
    }

    #[instrument(skip(self, fields), fields(base = %self.base_id))]
    fn update(&self, table: Table, id: &str, fields: Fields) -> StorageResult<Value> {
        let url = format!("{}/{}", self.table_url(table), id);
        let body = json!({ "fields": fields });
        self.send(|http| http.patch(&url).json(&body))
    }

    #[instrument(skip(self, rows), fields(base = %self.base_id, rows = rows.len()))]
    fn upsert(&self, table: Table, rows: Vec<Fields>, key_fields: &[&str]) -> StorageResult<Vec<Value>> {
        let url = self.table_url(table);
        let records: Vec<Value> = rows.into_iter().map(|fields| json!({ "fields": fields })).collect();
        let body = json!({
            "performUpsert": { "fieldsToMergeOn": key_fields },
            "records": records,
        });
        let response = self.send(|http| http.patch(&url).json(&body))?;
        Ok(take_records(response))
    }
}

impl std::fmt::Debug for AirtableClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableClient")
            .field("base_id", &self.base_id)
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url() {
        let client = AirtableClient::new("token", "appG5koP3D8kWbLdl").with_api_url("http://localhost:9");
        assert_eq!(client.table_url(Table::Users), "http://localhost:9/appG5koP3D8kWbLdl/Users");
    }

    #[test]
    fn test_debug_hides_token() {
        let client = AirtableClient::new("secret-token", "app1");
        assert!(!format!("{:?}", client).contains("secret-token"));
    }

    #[test]
    fn test_low_level_backoff_doubles() {
        let delays: Vec<Duration> = low_level_delays().collect();
        assert_eq!(delays, vec![Duration::from_millis(100), Duration::from_millis(200)]);
    }

    #[test]
    fn test_take_records_tolerates_missing_array() {
        assert!(take_records(json!({})).is_empty());
        assert_eq!(take_records(json!({"records": [{"id": "rec1"}]})).len(), 1);
    }
}
