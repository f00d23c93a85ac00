// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Precache storage
//!
//! Secondary resources listed by the open request are written here by the
//! prefetch queue, one entry per resource URL.

mod disk;
mod error;
mod shared;

pub use disk::{DiskCache, Editor};
pub use error::CacheError;
pub use shared::SharedDiskCache;

/// Subdirectory of the cache directory holding the precache.
pub const CACHE_SUBDIR: &str = "apicache";

/// Bumping this invalidates every existing entry.
pub const CACHE_VERSION: u32 = 100;

/// Streams per entry.
pub const VALUE_COUNT: usize = 1;

/// Stream holding the resource body.
pub const PRECACHE_STREAM_INDEX: usize = 0;
