//! Worker pool backing the bridge.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Notify, oneshot};
use tracing::{debug, error};

/// Fixed-size set of worker threads.
///
/// A worker that panics marks the whole pool as broken: the pool keeps
/// whatever jobs are already queued, but the bridge stops handing it new
/// work and builds a replacement instead.
pub struct ExecutorPool {
    threads: rayon::ThreadPool,
    generation: u64,
    broken: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl ExecutorPool {
    /// Spawn `workers` threads named `<thread_name>-<generation>-<index>`.
    pub fn new(
        workers: usize,
        thread_name: &str,
        generation: u64,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let prefix = format!("{}-{}", thread_name, generation);
        let threads = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(move |index| format!("{}-{}", prefix, index))
            .build()?;

        debug!(workers, generation, "Started executor pool");

        Ok(Self {
            threads,
            generation,
            broken: Arc::new(AtomicBool::new(false)),
            cancelled: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(Notify::new()),
        })
    }

    /// How many pools the owning bridge built before this one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a worker has died since the pool was built.
    pub fn is_broken(&self) -> bool {
        self.broken.load(Ordering::SeqCst)
    }

    /// Number of jobs queued or running.
    pub fn active_jobs(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Queue `job` and return a receiver for its output.
    ///
    /// The receiver errors if the job panicked. A job whose receiver was
    /// dropped before a worker picked it up is skipped, as is every job still
    /// queued once the pool is cancelled.
    pub fn submit<F, T>(&self, job: F) -> oneshot::Receiver<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let cancelled = Arc::clone(&self.cancelled);
        let broken = Arc::clone(&self.broken);
        let generation = self.generation;
        let tracker = ActiveJob::enter(Arc::clone(&self.active), Arc::clone(&self.idle));

        self.threads.spawn(move || {
            let _tracker = tracker;
            if tx.is_closed() || cancelled.load(Ordering::SeqCst) {
                debug!("Skipping abandoned job");
                return;
            }
            match panic::catch_unwind(AssertUnwindSafe(job)) {
                Ok(output) => {
                    let _ = tx.send(output);
                }
                Err(_) => {
                    // Flag first so the waiting caller sees a broken pool.
                    error!(generation, "Worker panicked, marking pool as broken");
                    broken.store(true, Ordering::SeqCst);
                    drop(tx);
                }
            }
        });

        rx
    }

    /// Drop every job that has not started yet.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Wait until no job is queued or running.
    pub async fn drained(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.active_jobs() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Keeps the active job count accurate even when the job unwinds.
struct ActiveJob {
    active: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl ActiveJob {
    fn enter(active: Arc<AtomicUsize>, idle: Arc<Notify>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self { active, idle }
    }
}

impl Drop for ActiveJob {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}
