//! Bounded-concurrency bridge from async code to blocking functions.

use crate::{BridgeConfig, ExecutorPool, WorkResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};

/// How many times a single call may rebuild a broken pool.
const MAX_POOL_RECOVERIES: usize = 1;

/// Runs blocking functions on a lazily created worker pool.
///
/// At most `max_workers` calls are in flight at once; further callers wait
/// on the admission semaphore without blocking the runtime. The pool itself
/// is only built on the first call and rebuilt whenever a worker panics.
///
/// # Example
///
/// ```rust,no_run
/// use algebrach_bridge::{BlockingBridge, BridgeConfig, WorkResult};
/// use std::time::Duration;
///
/// # async fn demo() {
/// let bridge = BlockingBridge::new(BridgeConfig::default().with_max_workers(2));
///
/// let slow = bridge
///     .run_with_timeout(|| std::thread::sleep(Duration::from_secs(5)), Some(Duration::from_millis(100)))
///     .await;
/// assert!(slow.is_timed_out());
///
/// bridge.shutdown(true).await;
/// # }
/// ```
pub struct BlockingBridge {
    config: BridgeConfig,
    admission: Arc<Semaphore>,
    pool: Mutex<Option<Arc<ExecutorPool>>>,
    generation: Mutex<u64>,
}

impl BlockingBridge {
    /// Create a bridge. No threads are spawned until the first call.
    pub fn new(config: BridgeConfig) -> Self {
        let workers = (*config.max_workers()).max(1);
        debug!(
            max_workers = workers,
            timeout = ?config.timeout(),
            "Creating blocking bridge"
        );
        Self {
            config: config.with_max_workers(workers),
            admission: Arc::new(Semaphore::new(workers)),
            pool: Mutex::new(None),
            generation: Mutex::new(0),
        }
    }

    /// Admission limit and pool size.
    pub fn max_workers(&self) -> usize {
        *self.config.max_workers()
    }

    /// Whether a pool currently exists.
    pub fn is_started(&self) -> bool {
        self.pool.lock().is_some()
    }

    /// Number of pools built so far.
    pub fn pools_created(&self) -> u64 {
        *self.generation.lock()
    }

    /// Number of admission slots not currently held.
    pub fn available_slots(&self) -> usize {
        self.admission.available_permits()
    }

    /// Run `function` with the configured timeout.
    pub async fn run<F, T>(&self, function: F) -> WorkResult<T>
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Send + 'static,
    {
        self.run_with_timeout(function, *self.config.timeout()).await
    }

    /// Run `function` on the pool, waiting at most `timeout` for it.
    ///
    /// `function` is `Fn` because a call that lands on a pool which breaks
    /// underneath it is submitted again to a fresh pool, once. Whatever the
    /// function returns, including its own `Err` values, is handed back
    /// untouched inside [`WorkResult::Value`].
    #[instrument(skip_all, fields(timeout_ms = timeout.map(|t| t.as_millis() as u64)))]
    pub async fn run_with_timeout<F, T>(&self, function: F, timeout: Option<Duration>) -> WorkResult<T>
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Send + 'static,
    {
        let function = Arc::new(function);

        for attempt in 0..=MAX_POOL_RECOVERIES {
            let Ok(_slot) = self.admission.acquire().await else {
                warn!("Bridge is shut down, refusing call");
                return WorkResult::PoolBroken;
            };

            let Some(pool) = self.current_pool() else {
                return WorkResult::PoolBroken;
            };

            let job = Arc::clone(&function);
            let receiver = pool.submit(move || job());

            let received = match timeout {
                Some(limit) => match tokio::time::timeout(limit, receiver).await {
                    Ok(received) => received,
                    Err(_) => {
                        warn!(timeout_ms = limit.as_millis() as u64, "Blocking call timed out");
                        return WorkResult::TimedOut;
                    }
                },
                None => receiver.await,
            };

            match received {
                Ok(value) => return WorkResult::Value(value),
                Err(_) => {
                    warn!(
                        attempt,
                        generation = pool.generation(),
                        "Worker pool broke during call, rebuilding"
                    );
                    self.discard(&pool);
                }
            }
        }

        error!("Worker pool broke again after rebuild");
        WorkResult::PoolBroken
    }

    /// Stop accepting calls and release the pool.
    ///
    /// With `wait`, first lets in-flight calls finish and waits for the
    /// workers to go idle. Jobs still queued are dropped either way. Calling
    /// this more than once is harmless.
    #[instrument(skip(self))]
    pub async fn shutdown(&self, wait: bool) {
        if self.admission.is_closed() {
            debug!("Bridge already shut down");
            return;
        }

        let drained_slots = if wait {
            self.admission
                .acquire_many(self.max_workers() as u32)
                .await
                .ok()
        } else {
            None
        };
        self.admission.close();
        drop(drained_slots);

        let pool = self.pool.lock().take();
        if let Some(pool) = pool {
            pool.cancel();
            if wait {
                pool.drained().await;
            }
        }

        info!(wait, "Blocking bridge shut down");
    }

    /// The live pool, building one if there is none or the last one broke.
    fn current_pool(&self) -> Option<Arc<ExecutorPool>> {
        let mut slot = self.pool.lock();
        if let Some(pool) = slot.as_ref() {
            if !pool.is_broken() {
                return Some(Arc::clone(pool));
            }
            warn!(generation = pool.generation(), "Discarding broken worker pool");
            pool.cancel();
        }

        let generation = {
            let mut generation = self.generation.lock();
            *generation += 1;
            *generation
        };

        match ExecutorPool::new(self.max_workers(), self.config.thread_name(), generation) {
            Ok(pool) => {
                let pool = Arc::new(pool);
                *slot = Some(Arc::clone(&pool));
                Some(pool)
            }
            Err(e) => {
                error!(error = %e, "Failed to build worker pool");
                *slot = None;
                None
            }
        }
    }

    /// Forget `pool` unless another caller already replaced it.
    fn discard(&self, pool: &Arc<ExecutorPool>) {
        let mut slot = self.pool.lock();
        if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, pool)) {
            pool.cancel();
            *slot = None;
        }
    }
}
