// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Versioned LRU disk cache
//!
//! Entries are keyed by arbitrary strings (resource URLs) and hold a fixed
//! number of byte streams. File names are the SHA-256 of the key plus the
//! stream index. A `journal.json` records the cache version, stream count
//! and entry order (least recently used first); opening a directory whose
//! journal disagrees on version or stream count wipes it.

use std::fs;
use std::path::{Path, PathBuf};

use ring::digest::{digest, SHA256};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::CacheError;

const JOURNAL_FILE: &str = "journal.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Journal {
    version: u32,
    value_count: usize,
    entries: Vec<JournalEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct JournalEntry {
    key: String,
    sizes: Vec<u64>,
}

impl JournalEntry {
    fn size(&self) -> u64 {
        self.sizes.iter().sum()
    }
}

/// Capacity-bounded key/value store on disk.
#[derive(Debug)]
pub struct DiskCache {
    dir: PathBuf,
    version: u32,
    value_count: usize,
    max_size: u64,
    entries: Vec<JournalEntry>,
    closed: bool,
}

impl DiskCache {
    /// Opens (or creates) a cache in `dir`.
    pub fn open(
        dir: impl AsRef<Path>,
        version: u32,
        value_count: usize,
        max_size: u64,
    ) -> Result<Self, CacheError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut cache = DiskCache {
            dir,
            version,
            value_count: value_count.max(1),
            max_size,
            entries: Vec::new(),
            closed: false,
        };

        match cache.read_journal() {
            Ok(Some(journal))
                if journal.version == cache.version && journal.value_count == cache.value_count =>
            {
                cache.entries = journal
                    .entries
                    .into_iter()
                    .filter(|e| cache.entry_files_exist(&e.key))
                    .collect();
            }
            Ok(Some(journal)) => {
                debug!(
                    old_version = journal.version,
                    new_version = cache.version,
                    "cache version changed, discarding entries"
                );
                cache.wipe()?;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "unreadable cache journal, discarding entries");
                cache.wipe()?;
            }
        }

        cache.write_journal()?;
        Ok(cache)
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn value_count(&self) -> usize {
        self.value_count
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Total bytes stored.
    pub fn size(&self) -> u64 {
        self.entries.iter().map(JournalEntry::size).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Reads one stream of an entry and marks it recently used.
    pub fn get(&mut self, key: &str, index: usize) -> Result<Option<Vec<u8>>, CacheError> {
        self.ensure_open()?;
        self.check_index(index)?;

        let Some(pos) = self.position(key) else {
            return Ok(None);
        };
        let data = match fs::read(self.stream_path(key, index)) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.entries.remove(pos);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let entry = self.entries.remove(pos);
        self.entries.push(entry);
        Ok(Some(data))
    }

    /// Starts writing an entry.
    pub fn edit(&mut self, key: &str) -> Result<Editor<'_>, CacheError> {
        self.ensure_open()?;
        let count = self.value_count;
        Ok(Editor {
            cache: self,
            key: key.to_string(),
            written: vec![None; count],
            done: false,
        })
    }

    /// Removes an entry. Returns whether it existed.
    pub fn remove(&mut self, key: &str) -> Result<bool, CacheError> {
        self.ensure_open()?;
        let Some(pos) = self.position(key) else {
            return Ok(false);
        };
        self.entries.remove(pos);
        self.delete_streams(key)?;
        Ok(true)
    }

    /// Persists the journal.
    pub fn flush(&self) -> Result<(), CacheError> {
        self.ensure_open()?;
        self.write_journal()
    }

    /// Flushes and closes. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<(), CacheError> {
        if self.closed {
            return Ok(());
        }
        self.write_journal()?;
        self.closed = true;
        Ok(())
    }

    /// Removes every entry and the journal.
    pub fn clear(&mut self) -> Result<(), CacheError> {
        self.ensure_open()?;
        self.wipe()?;
        self.write_journal()
    }

    fn ensure_open(&self) -> Result<(), CacheError> {
        if self.closed {
            Err(CacheError::Closed)
        } else {
            Ok(())
        }
    }

    fn check_index(&self, index: usize) -> Result<(), CacheError> {
        if index >= self.value_count {
            return Err(CacheError::InvalidIndex {
                index,
                count: self.value_count,
            });
        }
        Ok(())
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    fn file_stem(key: &str) -> String {
        hex::encode(digest(&SHA256, key.as_bytes()).as_ref())
    }

    fn stream_path(&self, key: &str, index: usize) -> PathBuf {
        self.dir.join(format!("{}.{}", Self::file_stem(key), index))
    }

    fn temp_path(&self, key: &str, index: usize) -> PathBuf {
        self.dir
            .join(format!("{}.{}.tmp", Self::file_stem(key), index))
    }

    fn entry_files_exist(&self, key: &str) -> bool {
        (0..self.value_count).all(|i| self.stream_path(key, i).exists())
    }

    fn delete_streams(&self, key: &str) -> Result<(), CacheError> {
        for index in 0..self.value_count {
            remove_if_exists(&self.stream_path(key, index))?;
        }
        Ok(())
    }

    fn wipe(&mut self) -> Result<(), CacheError> {
        self.entries.clear();
        fs::remove_dir_all(&self.dir)?;
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    fn read_journal(&self) -> Result<Option<Journal>, CacheError> {
        let path = self.dir.join(JOURNAL_FILE);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn write_journal(&self) -> Result<(), CacheError> {
        let journal = Journal {
            version: self.version,
            value_count: self.value_count,
            entries: self.entries.clone(),
        };
        let data = serde_json::to_vec_pretty(&journal)?;
        atomic_write(&self.dir.join(JOURNAL_FILE), &data)
    }

    fn trim_to_size(&mut self) -> Result<(), CacheError> {
        while self.size() > self.max_size && !self.entries.is_empty() {
            let evicted = self.entries.remove(0);
            debug!(key = %evicted.key, "evicting cache entry");
            self.delete_streams(&evicted.key)?;
        }
        Ok(())
    }
}

/// Pending write to one cache entry.
///
/// Dropping an editor without committing aborts it.
pub struct Editor<'a> {
    cache: &'a mut DiskCache,
    key: String,
    written: Vec<Option<u64>>,
    done: bool,
}

impl Editor<'_> {
    /// Writes the data of one stream.
    pub fn write(&mut self, index: usize, data: &[u8]) -> Result<(), CacheError> {
        self.cache.check_index(index)?;
        let size = data.len() as u64;
        if size > self.cache.max_size {
            return Err(CacheError::TooLarge {
                size,
                max: self.cache.max_size,
            });
        }
        fs::write(self.cache.temp_path(&self.key, index), data)?;
        self.written[index] = Some(size);
        Ok(())
    }

    /// Publishes the written streams and evicts old entries if needed.
    pub fn commit(mut self) -> Result<(), CacheError> {
        self.done = true;
        let existing = self
            .cache
            .position(&self.key)
            .map(|pos| self.cache.entries.remove(pos));

        let mut sizes = Vec::with_capacity(self.written.len());
        for (index, written) in self.written.iter().enumerate() {
            match (written, existing.as_ref()) {
                (Some(size), _) => {
                    fs::rename(
                        self.cache.temp_path(&self.key, index),
                        self.cache.stream_path(&self.key, index),
                    )?;
                    sizes.push(*size);
                }
                (None, Some(entry)) => sizes.push(entry.sizes[index]),
                (None, None) => {
                    self.discard_temp_files();
                    return Err(CacheError::IncompleteEntry(self.key.clone()));
                }
            }
        }

        self.cache.entries.push(JournalEntry {
            key: self.key.clone(),
            sizes,
        });
        self.cache.trim_to_size()
    }

    /// Discards everything written so far.
    pub fn abort(mut self) {
        self.done = true;
        self.discard_temp_files();
    }

    fn discard_temp_files(&self) {
        for index in 0..self.written.len() {
            if let Err(e) = remove_if_exists(&self.cache.temp_path(&self.key, index)) {
                warn!(key = %self.key, error = %e, "could not remove temp file");
            }
        }
    }
}

impl Drop for Editor<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.discard_temp_files();
        }
    }
}

/// Atomic file write (write to temp, then rename)
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), CacheError> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, data)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<(), CacheError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn put(cache: &mut DiskCache, key: &str, data: &[u8]) {
        let mut editor = cache.edit(key).unwrap();
        editor.write(0, data).unwrap();
        editor.commit().unwrap();
    }

    #[test]
    fn test_atomic_write() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("journal.json");

        atomic_write(&path, b"hello").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_lru_eviction_drops_oldest() {
        let temp = TempDir::new().unwrap();
        let mut cache = DiskCache::open(temp.path(), 1, 1, 10).unwrap();

        put(&mut cache, "a", b"aaaa");
        put(&mut cache, "b", b"bbbb");
        // touch "a" so "b" becomes the oldest
        cache.get("a", 0).unwrap();
        put(&mut cache, "c", b"cccc");

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.size(), 8);
    }

    #[test]
    fn test_uncommitted_editor_leaves_no_entry() {
        let temp = TempDir::new().unwrap();
        let mut cache = DiskCache::open(temp.path(), 1, 1, 1024).unwrap();
        {
            let mut editor = cache.edit("k").unwrap();
            editor.write(0, b"data").unwrap();
        }
        assert!(!cache.contains("k"));
        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_commit_without_data_fails() {
        let temp = TempDir::new().unwrap();
        let mut cache = DiskCache::open(temp.path(), 1, 1, 1024).unwrap();
        let editor = cache.edit("k").unwrap();
        assert!(matches!(
            editor.commit(),
            Err(CacheError::IncompleteEntry(_))
        ));
    }

    #[test]
    fn test_invalid_stream_index() {
        let temp = TempDir::new().unwrap();
        let mut cache = DiskCache::open(temp.path(), 1, 1, 1024).unwrap();
        let mut editor = cache.edit("k").unwrap();
        assert!(matches!(
            editor.write(1, b"x"),
            Err(CacheError::InvalidIndex { index: 1, count: 1 })
        ));
    }
}
