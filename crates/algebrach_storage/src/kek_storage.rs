//! Cached, retried access to the kek base.

use crate::models::record_id;
use crate::{Actor, KekRecord, NewKek, RecordStore, RetryPolicy, Table, UserRecord};
use algebrach_bridge::{BlockingBridge, BridgeConfig, WorkResult};
use algebrach_cache::{CacheConfig, TtlCache};
use algebrach_error::{StorageError, StorageErrorKind, StorageResult};
use derive_getters::Getters;
use derive_setters::Setters;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Tuning for [`KekStorage`].
#[derive(Debug, Clone, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct KekStorageConfig {
    /// How long list reads are served from cache
    cache_ttl: Duration,
    /// Per-call limit on a single store call
    call_timeout: Option<Duration>,
    /// Concurrent store calls allowed
    max_workers: usize,
    /// Retry policy wrapped around every store call
    retry: RetryPolicy,
}

impl Default for KekStorageConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            call_timeout: Some(algebrach_bridge::DEFAULT_TIMEOUT),
            max_workers: 1,
            retry: RetryPolicy::default(),
        }
    }
}

/// The kek base as seen by command handlers.
///
/// Every store call runs on the blocking bridge and is wrapped in the retry
/// policy; a bridge timeout counts as a retryable failure. The two list reads
/// are cached for the configured TTL and a miss is filled by a single fetch
/// even under concurrent callers. Writes never touch the cache.
pub struct KekStorage {
    store: Arc<dyn RecordStore>,
    bridge: BlockingBridge,
    retry: RetryPolicy,
    records: TtlCache<(), Arc<Vec<KekRecord>>>,
    users: TtlCache<(), Arc<Vec<UserRecord>>>,
}

impl KekStorage {
    /// Wrap `store`. The worker pool is only started by the first call.
    pub fn new(store: Arc<dyn RecordStore>, config: KekStorageConfig) -> Self {
        let bridge = BlockingBridge::new(
            BridgeConfig::default()
                .with_max_workers(config.max_workers)
                .with_timeout(config.call_timeout)
                .with_thread_name("kek-storage"),
        );
        let cache_config = CacheConfig::default().with_ttl_ms(config.cache_ttl.as_millis() as u64);
        info!(
            cache_ttl_secs = config.cache_ttl.as_secs(),
            max_workers = config.max_workers,
            "Creating kek storage"
        );
        Self {
            store,
            bridge,
            retry: config.retry,
            records: TtlCache::new(cache_config.clone()),
            users: TtlCache::new(cache_config),
        }
    }

    /// The bridge store calls run on.
    pub fn bridge(&self) -> &BlockingBridge {
        &self.bridge
    }

    /// All published keks.
    #[instrument(skip(self))]
    pub async fn list_records(&self) -> StorageResult<Arc<Vec<KekRecord>>> {
        self.records
            .get_or_try_fetch((), || async {
                let records: Vec<KekRecord> = self
                    .call("list_records", |store| parse_all(store.list(Table::List)?))
                    .await?;
                debug!(count = records.len(), "Fetched keks");
                Ok(Arc::new(records))
            })
            .await
    }

    /// All known users.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> StorageResult<Arc<Vec<UserRecord>>> {
        self.users
            .get_or_try_fetch((), || async {
                let users: Vec<UserRecord> = self
                    .call("list_users", |store| parse_all(store.list(Table::Users)?))
                    .await?;
                debug!(count = users.len(), "Fetched users");
                Ok(Arc::new(users))
            })
            .await
    }

    /// Record a kek suggestion by `suggestor` of something `author` said.
    #[instrument(skip(self, author, suggestor, kek), fields(author = author.telegram_id, suggestor = suggestor.telegram_id))]
    pub async fn create_suggestion(&self, author: &Actor, suggestor: &Actor, kek: &NewKek) -> StorageResult<KekRecord> {
        let (author, suggestor, kek) = (author.clone(), suggestor.clone(), kek.clone());
        self.call("create_suggestion", move |store| {
            let author_id = upsert_actor(store, &author)?;
            let suggestor_id = upsert_actor(store, &suggestor)?;
            parse(store.create(Table::Suggestions, kek.to_fields(&author_id, Some(suggestor_id.as_str())))?)
        })
        .await
    }

    /// Publish a kek by `author` straight to the list.
    #[instrument(skip(self, author, kek), fields(author = author.telegram_id))]
    pub async fn create_direct_entry(&self, author: &Actor, kek: &NewKek) -> StorageResult<KekRecord> {
        let (author, kek) = (author.clone(), kek.clone());
        self.call("create_direct_entry", move |store| {
            let author_id = upsert_actor(store, &author)?;
            parse(store.create(Table::List, kek.to_fields(&author_id, None))?)
        })
        .await
    }

    /// Replace the Telegram file id stored for a kek.
    #[instrument(skip(self))]
    pub async fn update_file_id(&self, record_id: &str, file_id: &str) -> StorageResult<KekRecord> {
        if record_id.trim().is_empty() {
            return Err(StorageError::new(StorageErrorKind::MalformedInput(
                "record id is empty".to_string(),
            )));
        }
        if file_id.trim().is_empty() {
            return Err(StorageError::new(StorageErrorKind::MalformedInput(
                "file id is empty".to_string(),
            )));
        }

        let (record_id, file_id) = (record_id.to_string(), file_id.to_string());
        self.call("update_file_id", move |store| {
            let mut fields = crate::Fields::new();
            fields.insert("AttachmentFileID".into(), json!(file_id));
            parse(store.update(Table::List, &record_id, fields)?)
        })
        .await
    }

    /// Stop the bridge; see [`BlockingBridge::shutdown`].
    pub async fn shutdown(&self, wait: bool) {
        self.bridge.shutdown(wait).await;
    }

    /// Run `function` against the store on the bridge, with retries.
    async fn call<T, F>(&self, operation: &'static str, function: F) -> StorageResult<T>
    where
        F: Fn(&dyn RecordStore) -> StorageResult<T> + Send + Sync + 'static,
        T: Send + 'static,
    {
        let function = Arc::new(function);
        self.retry
            .run(operation, || {
                let store = Arc::clone(&self.store);
                let function = Arc::clone(&function);
                async move {
                    match self.bridge.run(move || function(store.as_ref())).await {
                        WorkResult::Value(result) => result,
                        WorkResult::TimedOut => Err(StorageError::new(StorageErrorKind::Timeout)),
                        WorkResult::PoolBroken => Err(StorageError::new(StorageErrorKind::WorkerPoolBroken)),
                    }
                }
            })
            .await
    }
}

impl std::fmt::Debug for KekStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KekStorage")
            .field("retry", &self.retry)
            .field("cached_lists", &(self.records.len() + self.users.len()))
            .finish_non_exhaustive()
    }
}

fn upsert_actor(store: &dyn RecordStore, actor: &Actor) -> StorageResult<String> {
    let records = store.upsert(Table::Users, vec![actor.to_fields()], &["TelegramID"])?;
    records
        .first()
        .and_then(record_id)
        .map(str::to_string)
        .ok_or_else(|| {
            StorageError::new(StorageErrorKind::RemoteRejected(format!(
                "upsert of user {} returned no record",
                actor.telegram_id
            )))
        })
}

fn parse<T: DeserializeOwned>(record: Value) -> StorageResult<T> {
    serde_json::from_value(record).map_err(|e| {
        StorageError::new(StorageErrorKind::RemoteRejected(format!(
            "record does not match the expected shape: {}",
            e
        )))
    })
}

fn parse_all<T: DeserializeOwned>(records: Vec<Value>) -> StorageResult<Vec<T>> {
    records.into_iter().map(parse).collect()
}
