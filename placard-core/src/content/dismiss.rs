// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Recent dismissal tracking.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::clock::Clock;

/// Number of dismissals remembered.
pub const DEFAULT_DISMISS_CAPACITY: usize = 32;

/// Bounded, time-ordered log of content dismissals.
///
/// Queries consume the log: stale entries are purged and the first entry
/// inside the window is taken, so asking twice without a new dismissal
/// answers `false` the second time.
pub struct DismissLog {
    stamps: Mutex<VecDeque<u64>>,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl DismissLog {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_capacity(clock, DEFAULT_DISMISS_CAPACITY)
    }

    pub fn with_capacity(clock: Arc<dyn Clock>, capacity: usize) -> Self {
        DismissLog {
            stamps: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            clock,
        }
    }

    /// Records a dismissal at the current wall time.
    pub fn record_dismissal(&self) {
        let now = self.clock.now_millis();
        let mut stamps = self.stamps.lock();
        if stamps.len() == self.capacity {
            stamps.pop_front();
        }
        stamps.push_back(now);
    }

    /// Whether content was dismissed within `window` of now.
    pub fn dismissed_within(&self, window: Duration) -> bool {
        let now = self.clock.now_millis();
        let cutoff = now.saturating_sub(window.as_millis() as u64);
        let mut stamps = self.stamps.lock();

        while let Some(stamp) = stamps.pop_front() {
            if stamp >= cutoff {
                return true;
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.stamps.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.lock().is_empty()
    }
}

impl std::fmt::Debug for DismissLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DismissLog")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
