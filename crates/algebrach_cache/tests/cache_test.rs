//! Tests for the TTL cache.

use algebrach_cache::{CacheConfig, CacheConfigBuilder, TtlCache};
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn short_lived(ttl_ms: u64) -> TtlCache<&'static str, Vec<String>> {
    TtlCache::new(CacheConfig::default().with_ttl_ms(ttl_ms))
}

#[test]
fn test_cache_insert_and_get() {
    let cache = short_lived(60_000);
    cache.insert("records", vec!["Test kek".to_string()]);

    assert_eq!(cache.get(&"records"), Some(vec!["Test kek".to_string()]));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_miss() {
    let cache = short_lived(60_000);
    assert!(cache.get(&"records").is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_cache_expiration() {
    let cache = short_lived(60_000);
    cache.insert_with_ttl("records", vec![], Duration::from_millis(50));

    assert!(cache.get(&"records").is_some());
    std::thread::sleep(Duration::from_millis(80));
    assert!(cache.get(&"records").is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_cache_keys_are_independent() {
    let cache = short_lived(60_000);
    cache.insert("records", vec!["kek".to_string()]);
    cache.insert("users", vec!["rm_bk".to_string()]);

    assert_eq!(cache.get(&"records").unwrap()[0], "kek");
    assert_eq!(cache.get(&"users").unwrap()[0], "rm_bk");

    cache.invalidate(&"records");
    assert!(cache.get(&"records").is_none());
    assert!(cache.get(&"users").is_some());
}

#[test]
fn test_cache_disabled() {
    let config = CacheConfigBuilder::default().enabled(false).build().unwrap();
    let cache: TtlCache<&str, u32> = TtlCache::new(config);

    cache.insert("records", 1);
    assert!(cache.get(&"records").is_none());
}

#[test]
fn test_cache_evicts_oldest_at_capacity() {
    let cache: TtlCache<u32, u32> = TtlCache::new(CacheConfig::default().with_max_size(2));
    cache.insert(1, 1);
    std::thread::sleep(Duration::from_millis(2));
    cache.insert(2, 2);
    cache.insert(3, 3);

    assert_eq!(cache.len(), 2);
    assert!(cache.get(&1).is_none());
    assert_eq!(cache.get(&3), Some(3));
}

#[test]
fn test_cleanup_expired() {
    let cache = short_lived(60_000);
    cache.insert_with_ttl("records", vec![], Duration::from_millis(10));
    cache.insert("users", vec![]);
    std::thread::sleep(Duration::from_millis(30));

    assert_eq!(cache.cleanup_expired(), 1);
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_builder_defaults() {
    let config = CacheConfigBuilder::default().build().unwrap();
    assert_eq!(*config.ttl_ms(), 300_000);
    assert_eq!(config.ttl(), Duration::from_secs(300));
    assert!(*config.enabled());
}

#[tokio::test]
async fn test_fetch_once_within_ttl() {
    let cache = short_lived(60_000);
    let fetches = AtomicUsize::new(0);
    let counter = &fetches;

    for _ in 0..3 {
        let value = cache
            .get_or_try_fetch("records", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(vec!["Test kek".to_string()])
            })
            .await
            .unwrap();
        assert_eq!(value, vec!["Test kek".to_string()]);
    }

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_again_after_expiry() {
    let cache = short_lived(50);
    let fetches = AtomicUsize::new(0);
    let counter = &fetches;
    let fetch = move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(vec![])
    };

    cache.get_or_try_fetch("records", fetch).await.unwrap();
    cache.get_or_try_fetch("records", fetch).await.unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(80)).await;
    cache.get_or_try_fetch("records", fetch).await.unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_concurrent_misses_share_one_fetch() {
    let cache = Arc::new(short_lived(60_000));
    let fetches = Arc::new(AtomicUsize::new(0));

    let callers = (0..8).map(|_| {
        let cache = Arc::clone(&cache);
        let fetches = Arc::clone(&fetches);
        async move {
            cache
                .get_or_try_fetch("records", || async move {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, String>(vec!["kek".to_string()])
                })
                .await
        }
    });
    let results = join_all(callers).await;

    assert!(results.iter().all(|r| r.as_ref().unwrap()[0] == "kek"));
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_errors_are_not_cached() {
    let cache = short_lived(60_000);

    let failed = cache
        .get_or_try_fetch("records", || async { Err::<Vec<String>, _>("timeout") })
        .await;
    assert_eq!(failed, Err("timeout"));
    assert!(cache.is_empty());

    let recovered = cache
        .get_or_try_fetch("records", || async { Ok::<_, &str>(vec!["kek".to_string()]) })
        .await;
    assert_eq!(recovered.unwrap(), vec!["kek".to_string()]);
}
