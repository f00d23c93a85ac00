// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session Accounting
//!
//! Tracks foreground time across app sessions. A session segment runs from
//! `start()` until `pause()`; pauses and resumes bracket host visibility.
//! Totals are persisted to a [`KeyValueStore`] when a started session is
//! paused or finalized and reloaded when the session is created.

mod store;

pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError};

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::clock::Clock;

/// Preference key for the accumulated foreground seconds.
pub const TOTAL_TIME_KEY: &str = "time_in_game_ssum";

/// Preference key for the number of completed sessions.
pub const SESSION_COUNT_KEY: &str = "time_in_game_scount";

/// Session shared by every request of a context.
pub type SharedSession = Arc<Mutex<Session>>;

/// Foreground-time accumulator.
pub struct Session {
    store: Box<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    /// Persisted total seconds
    total_time: u64,
    /// Seconds accumulated in the current segment before the last pause
    session_time: u64,
    /// Uptime (ms) when the running segment resumed
    resumed_at: u64,
    session_count: u64,
    started: bool,
    paused: bool,
}

impl Session {
    /// Creates a session and loads persisted totals.
    pub fn new(store: Box<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let total_time = read_or_zero(store.as_ref(), TOTAL_TIME_KEY);
        let session_count = read_or_zero(store.as_ref(), SESSION_COUNT_KEY);
        let resumed_at = clock.uptime_millis();

        Session {
            store,
            clock,
            total_time,
            session_time: 0,
            resumed_at,
            session_count,
            started: false,
            paused: true,
        }
    }

    /// Begins a new session. A session already running is folded into
    /// the total and counted.
    pub fn start(&mut self) {
        if self.started {
            self.total_time += self.session_time();
            self.session_count += 1;
        }
        self.session_time = 0;
        self.resumed_at = self.clock.uptime_millis();
        self.started = true;
        debug!(
            total = self.total_time,
            count = self.session_count,
            "session started"
        );
    }

    /// Starts a fresh session after the server acknowledged the totals.
    pub fn start_and_reset(&mut self) {
        self.start();
        self.total_time = 0;
        self.session_count = 0;
    }

    /// Zeroes the in-memory counters. Storage is untouched.
    pub fn reset(&mut self) {
        self.total_time = 0;
        self.session_time = 0;
        self.session_count = 0;
        self.started = false;
        self.paused = true;
        self.resumed_at = self.clock.uptime_millis();
    }

    /// Seconds spent in the current session.
    pub fn session_time(&self) -> u64 {
        self.session_time + self.running_seconds()
    }

    /// Seconds across all sessions, including the current one.
    pub fn total_time(&self) -> u64 {
        self.total_time + self.session_time()
    }

    pub fn session_count(&self) -> u64 {
        self.session_count
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Host became visible. No-op unless paused.
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.resumed_at = self.clock.uptime_millis();
    }

    /// Host was hidden. No-op if already paused.
    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.session_time = self.session_time();
        self.paused = true;
        self.save();
    }

    /// Persists totals at teardown.
    pub fn finalize(&mut self) {
        if !self.paused {
            self.session_time = self.session_time();
            self.paused = true;
        }
        self.save();
    }

    /// Removes the persisted totals.
    pub fn clear(&mut self) {
        for key in [TOTAL_TIME_KEY, SESSION_COUNT_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "could not clear session value");
            }
        }
    }

    /// Seconds since the last resume, zero while paused or not started.
    fn running_seconds(&self) -> u64 {
        if !self.started || self.paused {
            return 0;
        }
        self.clock
            .uptime_millis()
            .saturating_sub(self.resumed_at)
            / 1000
    }

    fn save(&mut self) {
        if !self.started {
            return;
        }
        let total = self.total_time + self.session_time;
        let count = self.session_count + 1;
        self.persist(total, count);
    }

    fn persist(&mut self, total: u64, count: u64) {
        if let Err(e) = self.store.put_u64(TOTAL_TIME_KEY, total) {
            warn!(error = %e, "could not persist session time");
        }
        if let Err(e) = self.store.put_u64(SESSION_COUNT_KEY, count) {
            warn!(error = %e, "could not persist session count");
        }
    }
}

fn read_or_zero(store: &dyn KeyValueStore, key: &str) -> u64 {
    match store.get_u64(key) {
        Ok(value) => value.unwrap_or(0),
        Err(e) => {
            warn!(key, error = %e, "could not read session value");
            0
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("total_time", &self.total_time)
            .field("session_time", &self.session_time)
            .field("session_count", &self.session_count)
            .field("started", &self.started)
            .field("paused", &self.paused)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::time::Duration;

    fn session(clock: &Arc<ManualClock>) -> Session {
        Session::new(Box::new(MemoryStore::new()), clock.clone())
    }

    #[test]
    fn test_pause_freezes_session_time() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session(&clock);
        session.start();
        session.resume();
        clock.advance(Duration::from_secs(5));
        session.pause();
        clock.advance(Duration::from_secs(100));
        assert_eq!(session.session_time(), 5);
    }

    #[test]
    fn test_double_pause_is_noop() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session(&clock);
        session.start();
        session.resume();
        clock.advance(Duration::from_secs(3));
        session.pause();
        session.pause();
        assert_eq!(session.session_time(), 3);
    }

    #[test]
    fn test_double_resume_does_not_restart_segment() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session(&clock);
        session.start();
        session.resume();
        clock.advance(Duration::from_secs(4));
        session.resume();
        clock.advance(Duration::from_secs(4));
        assert_eq!(session.session_time(), 8);
    }
}
