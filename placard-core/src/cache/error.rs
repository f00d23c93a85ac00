// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io;

use thiserror::Error;

/// Errors that can occur with the disk cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Journal (de)serialization error
    #[error("Journal error: {0}")]
    Journal(#[from] serde_json::Error),

    /// The cache was closed
    #[error("Cache is closed")]
    Closed,

    /// Stream index outside the configured value count
    #[error("Stream index {index} out of range (value count {count})")]
    InvalidIndex {
        /// Requested index
        index: usize,
        /// Streams per entry
        count: usize,
    },

    /// Commit attempted before every stream of a new entry was written
    #[error("Entry {0} is missing stream data")]
    IncompleteEntry(String),

    /// Single entry larger than the whole cache
    #[error("Entry too large: {size} bytes (max {max})")]
    TooLarge {
        /// Entry size in bytes
        size: u64,
        /// Cache capacity in bytes
        max: u64,
    },
}
