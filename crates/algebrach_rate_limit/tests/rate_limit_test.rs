//! Tests for throttling and reply cooldowns.

use algebrach_rate_limit::{DEFAULT_REPLY_INTERVAL, PRUNE_EVERY, ReplyCooldown, ThrottleSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[tokio::test]
async fn test_second_invocation_dropped_while_first_in_flight() {
    let throttle = ThrottleSet::new();
    let release = Arc::new(Notify::new());

    let first = {
        let throttle = throttle.clone();
        let release = Arc::clone(&release);
        tokio::spawn(async move {
            let _guard = throttle.try_enter(28006241).unwrap();
            release.notified().await;
        })
    };

    while !throttle.contains(28006241) {
        tokio::task::yield_now().await;
    }
    assert!(throttle.try_enter(28006241).is_none());

    release.notify_one();
    first.await.unwrap();

    assert!(throttle.try_enter(28006241).is_some());
}

#[tokio::test]
async fn test_guard_released_when_task_fails() {
    let throttle = ThrottleSet::new();

    let failing = {
        let throttle = throttle.clone();
        tokio::spawn(async move {
            let _guard = throttle.try_enter(1).unwrap();
            Err::<(), &str>("handler failed")
        })
    };

    assert!(failing.await.unwrap().is_err());
    assert!(throttle.try_enter(1).is_some());
}

#[test]
fn test_default_interval_is_one_hour() {
    let cooldown = ReplyCooldown::default();
    assert_eq!(cooldown.interval(), DEFAULT_REPLY_INTERVAL);
    assert_eq!(DEFAULT_REPLY_INTERVAL, Duration::from_secs(3600));
}

#[test]
fn test_one_reply_per_window() {
    let cooldown = ReplyCooldown::new(Duration::from_millis(200));

    assert!(cooldown.try_acquire(-1001091546301));
    assert!(!cooldown.try_acquire(-1001091546301));
    assert!(!cooldown.try_acquire(-1001091546301));

    std::thread::sleep(Duration::from_millis(250));

    assert!(cooldown.try_acquire(-1001091546301));
    assert!(!cooldown.try_acquire(-1001091546301));
}

#[test]
fn test_chats_cool_down_independently() {
    let cooldown = ReplyCooldown::new(Duration::from_secs(3600));

    assert!(cooldown.try_acquire(1));
    assert!(cooldown.try_acquire(2));
    assert!(!cooldown.try_acquire(1));
    cooldown.prune();
    assert!(!cooldown.try_acquire(2));
}

#[test]
fn test_cooled_down_chats_are_forgotten() {
    let cooldown = ReplyCooldown::new(Duration::from_millis(20));
    let first_batch = PRUNE_EVERY as i64 - 1;

    for chat_id in 0..first_batch {
        assert!(cooldown.try_acquire(chat_id));
    }
    assert_eq!(cooldown.tracked_chats(), first_batch as usize);

    std::thread::sleep(Duration::from_millis(60));

    // This check is the periodic one and sweeps the expired chats.
    assert!(cooldown.try_acquire(-1));
    assert_eq!(cooldown.tracked_chats(), 1);
}

#[test]
fn test_zero_interval_never_suppresses() {
    let cooldown = ReplyCooldown::new(Duration::ZERO);
    assert!(cooldown.try_acquire(1));
    assert!(cooldown.try_acquire(1));
}
