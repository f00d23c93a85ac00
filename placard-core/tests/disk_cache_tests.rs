// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for cache (versioned disk cache and the shared precache handle)

use std::fs;

use placard_core::cache::{CACHE_SUBDIR, CACHE_VERSION, PRECACHE_STREAM_INDEX, VALUE_COUNT};
use placard_core::{CacheError, DiskCache, SharedDiskCache};
use tempfile::TempDir;

const URL: &str = "https://cdn.placard.app/assets/a.png";

fn put(cache: &mut DiskCache, key: &str, data: &[u8]) {
    let mut editor = cache.edit(key).unwrap();
    editor.write(0, data).unwrap();
    editor.commit().unwrap();
}

#[test]
fn test_entries_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut cache = DiskCache::open(dir.path(), CACHE_VERSION, VALUE_COUNT, 1024).unwrap();
        put(&mut cache, URL, b"payload");
        cache.close().unwrap();
    }

    let mut cache = DiskCache::open(dir.path(), CACHE_VERSION, VALUE_COUNT, 1024).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.size(), 7);
    assert_eq!(cache.get(URL, 0).unwrap().as_deref(), Some(&b"payload"[..]));
}

#[test]
fn test_version_bump_invalidates_entries() {
    let dir = TempDir::new().unwrap();
    {
        let mut cache = DiskCache::open(dir.path(), CACHE_VERSION, VALUE_COUNT, 1024).unwrap();
        put(&mut cache, URL, b"old");
        cache.close().unwrap();
    }

    let mut cache = DiskCache::open(dir.path(), CACHE_VERSION + 1, VALUE_COUNT, 1024).unwrap();
    assert!(cache.is_empty());
    assert_eq!(cache.get(URL, 0).unwrap(), None);
}

#[test]
fn test_stream_count_change_invalidates_entries() {
    let dir = TempDir::new().unwrap();
    {
        let mut cache = DiskCache::open(dir.path(), CACHE_VERSION, 1, 1024).unwrap();
        put(&mut cache, URL, b"old");
        cache.close().unwrap();
    }

    let cache = DiskCache::open(dir.path(), CACHE_VERSION, 2, 1024).unwrap();
    assert!(cache.is_empty());
}

#[test]
fn test_corrupt_journal_is_discarded() {
    let dir = TempDir::new().unwrap();
    {
        let mut cache = DiskCache::open(dir.path(), CACHE_VERSION, VALUE_COUNT, 1024).unwrap();
        put(&mut cache, URL, b"data");
        cache.close().unwrap();
    }
    fs::write(dir.path().join("journal.json"), b"{ not json").unwrap();

    let cache = DiskCache::open(dir.path(), CACHE_VERSION, VALUE_COUNT, 1024).unwrap();
    assert!(cache.is_empty());
}

#[test]
fn test_recently_read_entries_are_kept() {
    let dir = TempDir::new().unwrap();
    let mut cache = DiskCache::open(dir.path(), CACHE_VERSION, VALUE_COUNT, 10).unwrap();
    put(&mut cache, "a", b"aaaa");
    put(&mut cache, "b", b"bbbb");

    cache.get("a", 0).unwrap();
    put(&mut cache, "c", b"cccc");

    assert!(cache.contains("a"));
    assert!(!cache.contains("b"));
    assert!(cache.contains("c"));
    assert!(cache.size() <= 10);
}

#[test]
fn test_rewrite_replaces_entry() {
    let dir = TempDir::new().unwrap();
    let mut cache = DiskCache::open(dir.path(), CACHE_VERSION, VALUE_COUNT, 1024).unwrap();
    put(&mut cache, URL, b"first");
    put(&mut cache, URL, b"second!");

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.size(), 7);
    assert_eq!(cache.get(URL, 0).unwrap().as_deref(), Some(&b"second!"[..]));
}

#[test]
fn test_oversized_write_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut cache = DiskCache::open(dir.path(), CACHE_VERSION, VALUE_COUNT, 4).unwrap();
    let mut editor = cache.edit(URL).unwrap();
    assert!(matches!(
        editor.write(0, b"too large"),
        Err(CacheError::TooLarge { size: 9, max: 4 })
    ));
}

#[test]
fn test_remove_and_clear() {
    let dir = TempDir::new().unwrap();
    let mut cache = DiskCache::open(dir.path(), CACHE_VERSION, VALUE_COUNT, 1024).unwrap();
    put(&mut cache, "a", b"1");
    put(&mut cache, "b", b"2");

    assert!(cache.remove("a").unwrap());
    assert!(!cache.remove("a").unwrap());
    assert_eq!(cache.len(), 1);

    cache.clear().unwrap();
    assert!(cache.is_empty());
    assert_eq!(cache.size(), 0);
}

#[test]
fn test_closed_cache_rejects_operations() {
    let dir = TempDir::new().unwrap();
    let mut cache = DiskCache::open(dir.path(), CACHE_VERSION, VALUE_COUNT, 1024).unwrap();
    cache.close().unwrap();
    cache.close().unwrap();

    assert!(cache.is_closed());
    assert!(matches!(cache.get(URL, 0), Err(CacheError::Closed)));
    assert!(matches!(cache.edit(URL), Err(CacheError::Closed)));
}

#[test]
fn test_shared_cache_lives_in_fixed_subdirectory() {
    let dir = TempDir::new().unwrap();
    let shared = SharedDiskCache::new(dir.path(), 1024);
    assert_eq!(shared.directory(), dir.path().join(CACHE_SUBDIR));

    shared.open().unwrap();
    shared.store(URL, b"asset").unwrap();
    shared.close().unwrap();

    let mut cache =
        DiskCache::open(dir.path().join(CACHE_SUBDIR), CACHE_VERSION, VALUE_COUNT, 1024).unwrap();
    assert_eq!(
        cache.get(URL, PRECACHE_STREAM_INDEX).unwrap().as_deref(),
        Some(&b"asset"[..])
    );
}

#[test]
fn test_shared_cache_clones_share_handle() {
    let dir = TempDir::new().unwrap();
    let shared = SharedDiskCache::new(dir.path(), 1024);
    let other = shared.clone();

    shared.open().unwrap();
    assert!(other.is_open());
    other.store(URL, b"x").unwrap();
    assert!(shared.contains(URL));

    other.close().unwrap();
    assert!(!shared.is_open());
    assert!(matches!(shared.store(URL, b"y"), Err(CacheError::Closed)));
}
