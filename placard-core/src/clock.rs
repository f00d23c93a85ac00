// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Time sources for session accounting and dismissal tracking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of wall-clock and monotonic time.
pub trait Clock: Send + Sync {
    /// Milliseconds since the UNIX epoch.
    fn now_millis(&self) -> u64;

    /// Monotonic milliseconds since an arbitrary fixed point.
    fn uptime_millis(&self) -> u64;
}

/// Clock backed by the operating system.
#[derive(Debug)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn uptime_millis(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Manually driven clock for tests. Both readings advance together.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
    uptime: AtomicU64,
}

impl ManualClock {
    /// Creates a clock reading `now_millis` on the wall and zero uptime.
    pub fn new(now_millis: u64) -> Self {
        ManualClock {
            now: AtomicU64::new(now_millis),
            uptime: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        let ms = by.as_millis() as u64;
        self.now.fetch_add(ms, Ordering::SeqCst);
        self.uptime.fetch_add(ms, Ordering::SeqCst);
    }

    /// Moves the wall clock only. Uptime is untouched.
    pub fn set_now(&self, now_millis: u64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn uptime_millis(&self) -> u64 {
        self.uptime.load(Ordering::SeqCst)
    }
}
