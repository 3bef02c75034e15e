//! Tests for the blocking-call bridge.

use algebrach_bridge::{BlockingBridge, BridgeConfig, WorkResult};
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::sleep;
use std::time::{Duration, Instant};

fn bridge(workers: usize) -> BlockingBridge {
    BlockingBridge::new(BridgeConfig::default().with_max_workers(workers))
}

#[tokio::test]
async fn test_pool_is_created_lazily() {
    let bridge = bridge(2);
    assert!(!bridge.is_started());
    assert_eq!(bridge.pools_created(), 0);

    let result = bridge.run(|| 3 + 4).await;

    assert_eq!(result, WorkResult::Value(7));
    assert!(bridge.is_started());
    assert_eq!(bridge.pools_created(), 1);
    bridge.shutdown(true).await;
}

#[tokio::test]
async fn test_concurrency_never_exceeds_max_workers() {
    let bridge = bridge(2);
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    let calls = (0..6).map(|i| {
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        bridge.run(move || {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(50));
            running.fetch_sub(1, Ordering::SeqCst);
            i
        })
    });
    let results = join_all(calls).await;

    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| matches!(r, WorkResult::Value(_))));
    assert!(peak.load(Ordering::SeqCst) <= 2);
    // Six 50ms calls on two workers need at least three rounds.
    assert!(start.elapsed() >= Duration::from_millis(140));
    bridge.shutdown(true).await;
}

#[tokio::test]
async fn test_excess_callers_wait_for_a_slot() {
    let bridge = Arc::new(bridge(1));
    assert_eq!(bridge.available_slots(), 1);

    let first_done = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&first_done);
    let slow = {
        let bridge = Arc::clone(&bridge);
        tokio::spawn(async move {
            bridge
                .run(move || {
                    sleep(Duration::from_millis(150));
                    flag.store(true, Ordering::SeqCst);
                })
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(bridge.available_slots(), 0);

    let observed = Arc::clone(&first_done);
    let second = bridge.run(move || observed.load(Ordering::SeqCst)).await;

    assert_eq!(second, WorkResult::Value(true));
    assert!(slow.await.unwrap().into_value().is_some());
    bridge.shutdown(true).await;
}

#[tokio::test]
async fn test_slow_call_times_out_promptly() {
    let bridge = bridge(1);
    let start = Instant::now();

    let result = bridge
        .run_with_timeout(
            || {
                sleep(Duration::from_secs(2));
                "completed"
            },
            Some(Duration::from_millis(100)),
        )
        .await;

    assert!(result.is_timed_out());
    assert!(start.elapsed() < Duration::from_millis(1000));
    assert_eq!(bridge.available_slots(), 1);
    bridge.shutdown(false).await;
}

#[tokio::test]
async fn test_function_errors_pass_through() {
    let bridge = bridge(1);

    let result = bridge.run(|| Err::<u8, String>("Test error".to_string())).await;

    assert_eq!(result, WorkResult::Value(Err("Test error".to_string())));
    bridge.shutdown(true).await;
}

#[tokio::test]
async fn test_broken_pool_is_rebuilt_and_call_retried() {
    let bridge = bridge(1);
    let first_attempt = Arc::new(AtomicBool::new(true));
    let attempts = Arc::new(AtomicUsize::new(0));

    let flag = Arc::clone(&first_attempt);
    let counter = Arc::clone(&attempts);
    let result = bridge
        .run(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            if flag.swap(false, Ordering::SeqCst) {
                panic!("worker died");
            }
            42
        })
        .await;

    assert_eq!(result, WorkResult::Value(42));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(bridge.pools_created(), 2);

    // The fresh pool keeps serving.
    assert_eq!(bridge.run(|| 1).await, WorkResult::Value(1));
    assert_eq!(bridge.pools_created(), 2);
    bridge.shutdown(true).await;
}

#[tokio::test]
async fn test_permanently_broken_call_retries_only_once() {
    let bridge = bridge(1);
    let attempts = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&attempts);
    let result: WorkResult<u8> = bridge
        .run(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            panic!("always broken")
        })
        .await;

    assert!(result.is_pool_broken());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    bridge.shutdown(true).await;
}

#[tokio::test]
async fn test_shutdown_is_idempotent_and_refuses_new_calls() {
    let bridge = bridge(2);
    assert_eq!(bridge.run(|| 5).await, WorkResult::Value(5));

    bridge.shutdown(true).await;
    bridge.shutdown(true).await;
    bridge.shutdown(false).await;

    assert!(!bridge.is_started());
    assert!(bridge.run(|| 5).await.is_pool_broken());
}

#[tokio::test]
async fn test_shutdown_before_first_call() {
    let bridge = bridge(1);
    bridge.shutdown(false).await;
    assert!(!bridge.is_started());
}
