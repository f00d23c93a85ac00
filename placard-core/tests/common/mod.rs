// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Common Test Utilities
//!
//! Shared fixtures for integration tests: identities, isolated contexts
//! over a mock HTTP client, and a recording host handle.

#![allow(dead_code)]

pub mod strategies;

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use placard_core::{
    Clock, Content, DeviceIdentity, HostHandle, MockHttpClient, SdkConfig, SdkContext,
};

pub const TOKEN: &str = "tok";
pub const SECRET: &str = "s3cr3t";
pub const DEVICE: &str = "device-123";

pub const CONTENT_URL: &str = "https://api.placard.app/v3/publisher/content/";
pub const OPEN_URL: &str = "https://api.placard.app/v3/publisher/open/";
pub const IAP_URL: &str = "https://api.placard.app/v3/publisher/iap/";

/// Identity with fixed credentials and device id.
pub fn identity() -> DeviceIdentity {
    DeviceIdentity::builder(TOKEN, SECRET)
        .device_id(DEVICE)
        .app("com.example.game", "1.2.0")
        .hardware("Pixel 8")
        .os("Android", "14")
        .language("en")
        .build()
}

/// Context over `mock` with its precache rooted in `dir`.
pub fn context(mock: &Arc<MockHttpClient>, dir: &Path) -> SdkContext {
    SdkContext::builder(identity())
        .config(SdkConfig::default().with_cache_dir(dir))
        .http_client(mock.clone())
        .build()
        .unwrap()
}

/// Like [`context`], with a custom clock.
pub fn context_with_clock(
    mock: &Arc<MockHttpClient>,
    dir: &Path,
    clock: Arc<dyn Clock>,
) -> SdkContext {
    SdkContext::builder(identity())
        .config(SdkConfig::default().with_cache_dir(dir))
        .http_client(mock.clone())
        .clock(clock)
        .build()
        .unwrap()
}

/// Wraps `payload` in the API envelope.
pub fn envelope(payload: serde_json::Value) -> Vec<u8> {
    serde_json::json!({ "response": payload }).to_string().into_bytes()
}

/// Host handle recording every display and launch.
pub struct RecordingHost {
    pub accepts_display: bool,
    pub handles_market: bool,
    pub displayed: Mutex<Vec<(Content, String)>>,
    pub launched: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingHost {
            accepts_display: true,
            handles_market: true,
            displayed: Mutex::new(Vec::new()),
            launched: Mutex::new(Vec::new()),
        })
    }

    /// A host whose UI is gone.
    pub fn unavailable() -> Arc<Self> {
        Arc::new(RecordingHost {
            accepts_display: false,
            handles_market: true,
            displayed: Mutex::new(Vec::new()),
            launched: Mutex::new(Vec::new()),
        })
    }

    /// A host without a store app.
    pub fn without_market() -> Arc<Self> {
        Arc::new(RecordingHost {
            accepts_display: true,
            handles_market: false,
            displayed: Mutex::new(Vec::new()),
            launched: Mutex::new(Vec::new()),
        })
    }

    pub fn last_tag(&self) -> Option<String> {
        self.displayed.lock().last().map(|(_, tag)| tag.clone())
    }

    pub fn launched(&self) -> Vec<String> {
        self.launched.lock().clone()
    }
}

impl HostHandle for RecordingHost {
    fn display_content(&self, content: &Content, tag: &str) -> bool {
        if !self.accepts_display {
            return false;
        }
        self.displayed.lock().push((content.clone(), tag.to_string()));
        true
    }

    fn launch_url(&self, url: &str) -> bool {
        self.launched.lock().push(url.to_string());
        true
    }

    fn can_open_scheme(&self, scheme: &str) -> bool {
        scheme != "market" || self.handles_market
    }
}

/// Query parameters of a recorded request URL.
pub fn query_value(url: &url::Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
