//! Tests for MemoryCacheStore

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use shared::{EnrichmentKind, EnrichmentPayload, ImageResult, Subject, TaxonomyResult};

use crate::services::clock::ManualClock;
use crate::services::memory_cache::MemoryCacheStore;
use crate::traits::{CacheStore, Clock};
use crate::types::{CacheEntry, CacheKey};

fn lion_key(kind: EnrichmentKind) -> CacheKey {
    let subject = Subject::new("African Lion").unwrap().with_scientific_name("Panthera leo");
    CacheKey::for_subject(kind, &subject)
}

fn image(url: &str) -> EnrichmentPayload {
    EnrichmentPayload::Image(ImageResult {
        url: url.to_string(),
        placeholder: false,
    })
}

fn store_with_clock() -> (MemoryCacheStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()));
    (MemoryCacheStore::with_clock(clock.clone()), clock)
}

#[test]
fn test_absent_key_reads_none() {
    let (store, _) = store_with_clock();
    assert!(store.read(&lion_key(EnrichmentKind::Image)).is_none());
    assert!(store.is_empty());
}

#[test]
fn test_write_then_read() {
    let (store, clock) = store_with_clock();
    let key = lion_key(EnrichmentKind::Image);

    let written = store.write(key.clone(), image("https://img.test/lion.jpg")).unwrap();
    assert_eq!(written.fetched_at, clock.now());

    let read = store.read(&key).expect("entry should be present");
    assert_eq!(read, written);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_freshness_boundary() {
    let (store, clock) = store_with_clock();
    let max_age = Duration::from_secs(60);
    let entry = store.write(lion_key(EnrichmentKind::Image), image("a")).unwrap();

    clock.advance(Duration::from_secs(59));
    assert!(store.is_fresh(&entry, max_age));

    clock.advance(Duration::from_secs(1));
    assert!(!store.is_fresh(&entry, max_age), "an entry exactly max_age old is expired");

    // Expired entries are still readable for stale serving
    assert!(store.read(&entry.key).is_some());
}

#[test]
fn test_overwrite_replaces_entry() {
    let (store, clock) = store_with_clock();
    let key = lion_key(EnrichmentKind::Image);

    store.write(key.clone(), image("old")).unwrap();
    clock.advance(Duration::from_secs(10));
    let newer = store.write(key.clone(), image("new")).unwrap();

    assert_eq!(store.read(&key), Some(newer));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_write_rejects_mismatched_payload() {
    let (store, _) = store_with_clock();
    let key = lion_key(EnrichmentKind::Taxonomy);

    let result = store.write(key.clone(), image("wrong kind"));
    assert!(result.is_err());
    assert!(store.read(&key).is_none());
}

#[test]
fn test_corrupt_entry_is_discarded() {
    let (store, clock) = store_with_clock();
    let key = lion_key(EnrichmentKind::Taxonomy);

    store.insert_raw(
        key.clone(),
        CacheEntry {
            key: key.clone(),
            payload: image("not a taxonomy"),
            fetched_at: clock.now(),
        },
    );
    assert!(store.read(&key).is_none());
    assert_eq!(store.len(), 0, "corrupt entry should be removed");

    store.insert_raw(
        key.clone(),
        CacheEntry {
            key: key.clone(),
            payload: EnrichmentPayload::Taxonomy(TaxonomyResult::unknown()),
            fetched_at: clock.now() + chrono::Duration::days(1),
        },
    );
    assert!(store.read(&key).is_none(), "entries from the future are not trusted");
}

#[test]
fn test_capacity_evicts_oldest() {
    let (store, clock) = store_with_clock();
    let store = store.with_capacity(Some(2));
    let names = ["Lion", "Tiger", "Bear"];

    for name in names {
        let key = CacheKey::for_subject(EnrichmentKind::Image, &Subject::new(name).unwrap());
        store.write(key, image(name)).unwrap();
        clock.advance(Duration::from_secs(1));
    }

    let keys: Vec<String> = store.keys().into_iter().map(|k| k.name).collect();
    assert_eq!(keys, vec!["bear".to_string(), "tiger".to_string()]);
}

#[test]
fn test_keys_are_normalized() {
    let (store, _) = store_with_clock();
    let key = CacheKey::for_subject(EnrichmentKind::Image, &Subject::new("Lion").unwrap());
    store.write(key, image("lion")).unwrap();

    let same = CacheKey::for_subject(EnrichmentKind::Image, &Subject::new("  lion ").unwrap());
    assert!(store.read(&same).is_some());
}

#[tokio::test]
async fn test_concurrent_writes_never_tear() {
    let store = Arc::new(MemoryCacheStore::new());
    let key = lion_key(EnrichmentKind::Image);

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        let key = key.clone();
        handles.push(tokio::spawn(async move {
            let url = format!("https://img.test/{i}.jpg");
            store.write(key.clone(), image(&url)).unwrap();
            let read = store.read(&key).unwrap();
            assert_eq!(read.key, key);
            assert_eq!(read.payload.kind(), EnrichmentKind::Image);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.len(), 1);
}
