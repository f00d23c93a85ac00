// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Process-wide precache handle
//!
//! Wraps a lazily opened [`DiskCache`] behind a mutex so concurrent callers
//! cannot race to create or close it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::disk::DiskCache;
use super::error::CacheError;
use super::{CACHE_SUBDIR, CACHE_VERSION, PRECACHE_STREAM_INDEX, VALUE_COUNT};

/// Cloneable handle to the precache.
#[derive(Debug, Clone)]
pub struct SharedDiskCache {
    dir: PathBuf,
    max_size: u64,
    inner: Arc<Mutex<Option<DiskCache>>>,
}

impl SharedDiskCache {
    /// Creates a handle for `<base_dir>/apicache`. Nothing is opened yet.
    pub fn new(base_dir: impl AsRef<Path>, max_size: u64) -> Self {
        SharedDiskCache {
            dir: base_dir.as_ref().join(CACHE_SUBDIR),
            max_size,
            inner: Arc::new(Mutex::new(None)),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Opens the cache if it is not already open. Idempotent.
    pub fn open(&self) -> Result<(), CacheError> {
        let mut guard = self.inner.lock();
        let needs_open = guard.as_ref().map_or(true, DiskCache::is_closed);
        if needs_open {
            debug!(dir = %self.dir.display(), "opening precache");
            *guard = Some(DiskCache::open(
                &self.dir,
                CACHE_VERSION,
                VALUE_COUNT,
                self.max_size,
            )?);
        }
        Ok(())
    }

    /// Closes the cache if open. Idempotent.
    pub fn close(&self) -> Result<(), CacheError> {
        let mut guard = self.inner.lock();
        if let Some(mut cache) = guard.take() {
            debug!(dir = %self.dir.display(), "closing precache");
            cache.close()?;
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.inner
            .lock()
            .as_ref()
            .is_some_and(|cache| !cache.is_closed())
    }

    /// Runs `f` against the open cache.
    pub fn with_cache<T>(
        &self,
        f: impl FnOnce(&mut DiskCache) -> Result<T, CacheError>,
    ) -> Result<T, CacheError> {
        let mut guard = self.inner.lock();
        match guard.as_mut() {
            Some(cache) if !cache.is_closed() => f(cache),
            _ => Err(CacheError::Closed),
        }
    }

    /// Writes `data` as the precache stream of `key`, then flushes.
    pub fn store(&self, key: &str, data: &[u8]) -> Result<(), CacheError> {
        self.with_cache(|cache| {
            let mut editor = cache.edit(key)?;
            editor.write(PRECACHE_STREAM_INDEX, data)?;
            editor.commit()?;
            cache.flush()
        })
    }

    /// Reads the precache stream of `key`.
    pub fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.with_cache(|cache| cache.get(key, PRECACHE_STREAM_INDEX))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.with_cache(|cache| Ok(cache.contains(key)))
            .unwrap_or(false)
    }
}
