use pretty_assertions::assert_eq;
use quotesync_storage::{
    LAST_VIEWED_KEY, MemoryStore, QUOTES_KEY, QuoteStore, SqliteStore, StorageError,
    decode_snapshot,
};
use quotesync_types::{LastViewed, Quote, QuoteCollection, default_quotes};

fn sample() -> QuoteCollection {
    vec![
        Quote::new("Life is a journey", "Wisdom"),
        Quote::new("Carpe diem", "Motivation"),
    ]
    .into()
}

// ── SqliteStore ──────────────────────────────────────────────────

#[test]
fn sqlite_load_empty_store_is_absent() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn sqlite_save_then_load_returns_same_collection() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.save(&sample()).unwrap();
    assert_eq!(store.load().unwrap(), Some(sample()));
}

#[test]
fn sqlite_save_overwrites_previous_snapshot() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.save(&default_quotes()).unwrap();
    store.save(&sample()).unwrap();
    assert_eq!(store.load().unwrap(), Some(sample()));
}

#[test]
fn sqlite_empty_collection_roundtrips_as_empty() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.save(&QuoteCollection::new()).unwrap();
    assert_eq!(store.load().unwrap(), Some(QuoteCollection::new()));
}

#[test]
fn sqlite_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("quotes.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store.save(&sample()).unwrap();
        store.save_last_viewed(&LastViewed::now(1));
    }

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.load().unwrap(), Some(sample()));
    assert_eq!(store.load_last_viewed().unwrap().index, 1);
}

#[test]
fn sqlite_malformed_snapshot_reads_as_absent() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .write(QUOTES_KEY, r#"[{"text":"ok","category":"fine"},{"text":"no category"}]"#)
        .unwrap();
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn sqlite_non_array_snapshot_reads_as_absent() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.write(QUOTES_KEY, r#"{"text":"a","category":"b"}"#).unwrap();
    assert_eq!(store.load().unwrap(), None);
}

// ── MemoryStore ──────────────────────────────────────────────────

#[test]
fn memory_roundtrip_and_write_count() {
    let store = MemoryStore::new();
    assert_eq!(store.write_count(), 0);
    store.save(&sample()).unwrap();
    assert_eq!(store.write_count(), 1);
    assert_eq!(store.load().unwrap(), Some(sample()));
}

#[test]
fn memory_failed_writes_surface_as_unavailable() {
    let store = MemoryStore::new();
    store.set_fail_writes(true);
    let err = store.save(&sample()).unwrap_err();
    assert!(matches!(err, StorageError::Unavailable(_)));
    assert_eq!(store.write_count(), 0);
    assert_eq!(store.load().unwrap(), None);

    store.set_fail_writes(false);
    store.save(&sample()).unwrap();
    assert_eq!(store.load().unwrap(), Some(sample()));
}

#[test]
fn memory_with_garbage_value_reads_as_absent() {
    let store = MemoryStore::with_value(QUOTES_KEY, "not json at all");
    assert_eq!(store.load().unwrap(), None);
}

// ── Last viewed marker ───────────────────────────────────────────

#[test]
fn last_viewed_absent_by_default() {
    let store = MemoryStore::new();
    assert_eq!(store.load_last_viewed(), None);
}

#[test]
fn last_viewed_roundtrip() {
    let store = MemoryStore::new();
    let viewed = LastViewed::now(3);
    store.save_last_viewed(&viewed);
    assert_eq!(store.load_last_viewed(), Some(viewed));
}

#[test]
fn last_viewed_garbage_reads_as_absent() {
    let store = MemoryStore::with_value(LAST_VIEWED_KEY, "three");
    assert_eq!(store.load_last_viewed(), None);
}

#[test]
fn last_viewed_write_failure_is_swallowed() {
    let store = MemoryStore::new();
    store.set_fail_writes(true);
    store.save_last_viewed(&LastViewed::now(0));
    assert_eq!(store.load_last_viewed(), None);
}

// ── decode_snapshot ──────────────────────────────────────────────

#[test]
fn decode_snapshot_accepts_valid_array() {
    let decoded = decode_snapshot(r#"[{"text":"a","category":"b"}]"#).unwrap();
    assert_eq!(decoded.as_slice(), &[Quote::new("a", "b")]);
}

#[test]
fn decode_snapshot_rejects_wrong_field_types() {
    assert_eq!(decode_snapshot(r#"[{"text":"a","category":5}]"#), None);
}
