// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Redirect Policy
//!
//! Decides hop by hop whether a response is a redirect worth following.
//! Every proposed location is recorded before its scheme is checked, so a
//! store URI that is never dereferenced is still visible to the caller.

use std::collections::HashSet;

use url::Url;

use super::client::HttpResponse;

/// Redirect cap meaning "no limit".
pub const UNLIMITED_REDIRECTS: u32 = u32::MAX;

/// Returns true for statuses treated as redirect candidates (300-307).
pub fn is_redirect_status(status: u16) -> bool {
    (300..=307).contains(&status)
}

/// URI schemes the transport is allowed to follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeRegistry {
    schemes: HashSet<String>,
}

impl Default for SchemeRegistry {
    fn default() -> Self {
        let mut registry = SchemeRegistry {
            schemes: HashSet::new(),
        };
        registry.register("http");
        registry.register("https");
        registry
    }
}

impl SchemeRegistry {
    /// Creates a registry that knows `http` and `https`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a followable scheme.
    pub fn register(&mut self, scheme: &str) {
        self.schemes.insert(scheme.to_ascii_lowercase());
    }

    pub fn is_registered(&self, scheme: &str) -> bool {
        self.schemes.contains(&scheme.to_ascii_lowercase())
    }
}

/// Ordered record of every proposed redirect location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectLog {
    urls: Vec<String>,
}

impl RedirectLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, url: impl Into<String>) {
        self.urls.push(url.into());
    }

    /// Most recent proposed location.
    pub fn last(&self) -> Option<&str> {
        self.urls.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    pub fn clear(&mut self) {
        self.urls.clear();
    }
}

/// Outcome of inspecting one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    /// Final response, not a redirect.
    NotRedirect,
    /// A redirect that must not be followed.
    Stop,
    /// Follow to the given location.
    Follow(Url),
}

/// Tracks redirects across the hops of one execution.
#[derive(Debug, Clone)]
pub struct RedirectTracker {
    max: u32,
    followed: u32,
    schemes: SchemeRegistry,
    log: RedirectLog,
}

impl RedirectTracker {
    pub fn new(max: u32, schemes: SchemeRegistry) -> Self {
        RedirectTracker {
            max,
            followed: 0,
            schemes,
            log: RedirectLog::new(),
        }
    }

    /// Inspects a response received for `current`.
    pub fn decide(&mut self, current: &Url, response: &HttpResponse) -> RedirectDecision {
        if !is_redirect_status(response.status) {
            return RedirectDecision::NotRedirect;
        }

        let Some(location) = response.header("location") else {
            return RedirectDecision::Stop;
        };
        let Ok(target) = current.join(location.trim()) else {
            return RedirectDecision::Stop;
        };

        // The cap is checked before recording so the log ends on the last hop taken.
        if self.followed >= self.max {
            return RedirectDecision::Stop;
        }

        self.log.push(target.as_str());

        if !self.schemes.is_registered(target.scheme()) {
            return RedirectDecision::Stop;
        }

        self.followed += 1;
        RedirectDecision::Follow(target)
    }

    pub fn followed(&self) -> u32 {
        self.followed
    }

    pub fn log(&self) -> &RedirectLog {
        &self.log
    }

    pub fn into_log(self) -> RedirectLog {
        self.log
    }
}
