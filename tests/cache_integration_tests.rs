//! Integration Tests for the Expiring Cache
//!
//! Exercises the public API end to end: expiry, invalidation, read-through
//! fetching and the sweeper lifecycle. Time-dependent tests run on tokio's
//! paused clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ttl_cache::{CacheError, Config, ExpiringCache, TtlClass};

const MINUTE: Duration = Duration::from_secs(60);

// == Helper Functions ==

#[derive(Debug, Clone, PartialEq)]
struct Employee {
    id: u32,
    name: String,
}

fn employee(id: u32) -> Employee {
    Employee {
        id,
        name: format!("employee-{id}"),
    }
}

// == Expiration ==

#[tokio::test(start_paused = true)]
async fn test_roundtrip_then_expiry() {
    let cache = ExpiringCache::new();

    cache.set("employee:1", employee(1), Duration::from_millis(10));
    assert_eq!(cache.get("employee:1"), Some(employee(1)));

    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(cache.get("employee:1"), None);
    // lazily evicted, not just hidden
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.stats().expirations, 1);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_reads_absent_before_sweep() {
    let cache = ExpiringCache::new();
    cache.set("attendance:today", 3u32, Duration::from_secs(1));

    tokio::time::advance(Duration::from_secs(2)).await;

    assert_eq!(cache.len(), 1, "entry is still stored");
    assert!(!cache.contains_key("attendance:today"));
    assert_eq!(cache.get("attendance:today"), None);
}

#[test]
fn test_zero_ttl_is_a_visible_no_op() {
    let cache = ExpiringCache::new();
    cache.set("cashdesk:1", 100i64, MINUTE);
    cache.set("cashdesk:1", 200i64, Duration::ZERO);

    assert_eq!(cache.get("cashdesk:1"), None);
    assert!(cache.is_empty());
}

#[test]
fn test_overwrite_replaces_value() {
    let cache = ExpiringCache::new();
    cache.set("employee:1", employee(1), MINUTE);
    cache.set("employee:1", employee(2), MINUTE);

    assert_eq!(cache.get("employee:1"), Some(employee(2)));
    assert_eq!(cache.len(), 1);
}

// == Invalidation ==

#[test]
fn test_invalidate_key_family() {
    let cache = ExpiringCache::new();
    cache.set("user:1", "a", MINUTE);
    cache.set("user:2", "b", MINUTE);
    cache.set("order:1", "c", MINUTE);

    assert_eq!(cache.invalidate("user:"), 2);

    assert_eq!(cache.get("user:1"), None);
    assert_eq!(cache.get("user:2"), None);
    assert_eq!(cache.get("order:1"), Some("c"));
}

#[test]
fn test_clear_on_logout() {
    let cache = ExpiringCache::new();
    for id in 0..5 {
        cache.set(format!("employee:{id}"), employee(id), MINUTE);
    }

    assert_eq!(cache.clear(), 5);

    for id in 0..5 {
        assert_eq!(cache.get(&format!("employee:{id}")), None);
    }
}

// == Read-through ==

#[tokio::test]
async fn test_wrap_hit_avoids_refetch() {
    let cache = ExpiringCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let fetch = || {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(employee(7))
        }
    };

    let first = cache.wrap("employee:7", MINUTE, fetch).await;
    let second = cache.wrap("employee:7", MINUTE, fetch).await;

    assert_eq!(first, Ok(employee(7)));
    assert_eq!(second, Ok(employee(7)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_wrap_failure_does_not_poison() {
    let cache: ExpiringCache<Employee> = ExpiringCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let failing = {
        let calls = calls.clone();
        move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<Employee, _>("document store unavailable")
        }
    };
    let result = cache.wrap("employee:9", MINUTE, failing).await;
    assert_eq!(result, Err("document store unavailable"));
    assert!(cache.is_empty());

    let succeeding = {
        let calls = calls.clone();
        move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, &str>(employee(9))
        }
    };
    let result = cache.wrap("employee:9", MINUTE, succeeding).await;

    assert_eq!(result, Ok(employee(9)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.get("employee:9"), Some(employee(9)));
}

#[tokio::test(start_paused = true)]
async fn test_wrap_refetches_after_expiry() {
    let cache = ExpiringCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let fetch = || {
        let calls = calls.clone();
        async move { Ok::<_, String>(calls.fetch_add(1, Ordering::SeqCst)) }
    };

    assert_eq!(cache.wrap_class("branch:balance", TtlClass::Volatile, fetch).await, Ok(0));
    tokio::time::advance(cache.ttl(TtlClass::Volatile)).await;
    assert_eq!(cache.wrap_class("branch:balance", TtlClass::Volatile, fetch).await, Ok(1));
}

#[tokio::test(start_paused = true)]
async fn test_wrap_coalesced_across_tasks() {
    let cache: ExpiringCache<Arc<Employee>> = ExpiringCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            cache
                .wrap_coalesced("employee:directory", MINUTE, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok::<_, String>(Arc::new(employee(1)))
                })
                .await
        }));
    }

    for handle in handles {
        let value = handle.await.unwrap().unwrap();
        assert_eq!(*value, employee(1));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.in_flight(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_wrap_coalesced_shares_value_with_zero_ttl() {
    let cache: ExpiringCache<u32> = ExpiringCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..5 {
        let cache = cache.clone();
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            cache
                .wrap_coalesced("cashdesk:live", Duration::ZERO, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok::<_, String>(11)
                })
                .await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Ok(11));
    }
    // waiters got the leader's value even though nothing was cached
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.stats().fetches, 1);
    assert!(cache.is_empty());
}

// == Sweeper ==

#[tokio::test(start_paused = true)]
async fn test_sweep_reclaims_without_reads() {
    let cache = ExpiringCache::new();
    cache.set("vacation:1", "pending", Duration::from_millis(10));
    cache.set("vacation:2", "approved", Duration::from_millis(10));
    cache.set("branding", "blue", Duration::from_secs(3600));

    assert_eq!(cache.start_sweeper(Duration::from_secs(1)), Ok(true));

    tokio::time::sleep(Duration::from_millis(3500)).await;

    assert_eq!(cache.len(), 1);
    let stats = cache.stats();
    assert_eq!(stats.swept, 2);
    assert!(stats.sweeps >= 3);
    assert_eq!(stats.hits + stats.misses, 0, "no reads were made");

    cache.stop_sweeper();
}

#[tokio::test]
async fn test_sweeper_lifecycle() {
    let cache: ExpiringCache<u32> = ExpiringCache::new();

    assert!(!cache.is_sweeper_running());
    assert_eq!(cache.start_sweeper(Duration::from_secs(1)), Ok(true));
    assert_eq!(cache.start_sweeper(Duration::from_secs(5)), Ok(false));
    assert!(cache.stop_sweeper());
    assert!(!cache.is_sweeper_running());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_cache_stops_sweeper() {
    let metrics = tokio::runtime::Handle::current().metrics();
    let cache: ExpiringCache<u32> = ExpiringCache::new();
    let other = cache.clone();

    assert_eq!(cache.start_sweeper(Duration::from_secs(1)), Ok(true));
    assert_eq!(metrics.num_alive_tasks(), 1);

    drop(cache);
    drop(other);
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(metrics.num_alive_tasks(), 0, "sweep task should be gone");
}

#[test]
fn test_sweeper_needs_runtime() {
    let cache: ExpiringCache<u32> = ExpiringCache::new();
    assert_eq!(
        cache.start_sweeper(Duration::from_secs(1)),
        Err(CacheError::NoRuntime)
    );
}

// == Configuration ==

#[test]
fn test_cache_from_config() {
    let config = Config {
        ttl_volatile: 5,
        ..Config::default()
    };
    let cache: ExpiringCache<String> = ExpiringCache::from_config(&config);

    assert_eq!(cache.ttl(TtlClass::Volatile), Duration::from_secs(5));
    assert_eq!(cache.ttl(TtlClass::Reference), Duration::from_secs(3600));
}
