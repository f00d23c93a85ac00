// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! SDK Context
//!
//! Owns the state shared by every request of one host: configuration,
//! device identity, HTTP client, session, precache, dismissal log and
//! conversion cookies. Cloning is cheap; clones share the same state.
//! Tests build isolated contexts instead of touching globals.
//!
//! # Example
//!
//! ```ignore
//! use placard_core::{DeviceIdentity, SdkConfig, SdkContext};
//!
//! let identity = DeviceIdentity::builder("token", "secret").device_id("abc").build();
//! let ctx = SdkContext::builder(identity)
//!     .config(SdkConfig::default().with_cache_dir("/tmp/placard"))
//!     .build()?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::SharedDiskCache;
use crate::clock::{Clock, SystemClock};
use crate::config::SdkConfig;
#[cfg(not(feature = "http"))]
use crate::config::ConfigurationError;
use crate::content::DismissLog;
use crate::error::SdkResult;
use crate::identity::DeviceIdentity;
use crate::network::HttpClient;
#[cfg(feature = "http")]
use crate::network::ReqwestClient;
use crate::purchases::ConversionCookies;
use crate::session::{KeyValueStore, MemoryStore, Session, SharedSession};

struct ContextInner {
    config: SdkConfig,
    identity: DeviceIdentity,
    client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    session: SharedSession,
    cache: SharedDiskCache,
    dismissals: DismissLog,
    cookies: ConversionCookies,
}

/// Shared SDK state.
#[derive(Clone)]
pub struct SdkContext {
    inner: Arc<ContextInner>,
}

impl SdkContext {
    pub fn builder(identity: DeviceIdentity) -> SdkContextBuilder {
        SdkContextBuilder::new(identity)
    }

    pub fn config(&self) -> &SdkConfig {
        &self.inner.config
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.inner.identity
    }

    pub fn client(&self) -> Arc<dyn HttpClient> {
        Arc::clone(&self.inner.client)
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.inner.clock)
    }

    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.inner.session)
    }

    pub fn cache(&self) -> &SharedDiskCache {
        &self.inner.cache
    }

    pub fn dismissals(&self) -> &DismissLog {
        &self.inner.dismissals
    }

    pub fn cookies(&self) -> &ConversionCookies {
        &self.inner.cookies
    }

    /// Whether any content was dismissed within `window`.
    ///
    /// Consumes the dismissal log, see [`DismissLog::dismissed_within`].
    pub fn dismissed_content_within(&self, window: Duration) -> bool {
        self.inner.dismissals.dismissed_within(window)
    }

    /// Persists session totals and closes the precache.
    pub fn shutdown(&self) -> SdkResult<()> {
        self.inner.session.lock().finalize();
        self.inner.cache.close()?;
        Ok(())
    }
}

impl std::fmt::Debug for SdkContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkContext")
            .field("config", &self.inner.config)
            .field("identity", &self.inner.identity)
            .finish_non_exhaustive()
    }
}

/// Builder for [`SdkContext`].
pub struct SdkContextBuilder {
    identity: DeviceIdentity,
    config: SdkConfig,
    client: Option<Arc<dyn HttpClient>>,
    store: Option<Box<dyn KeyValueStore>>,
    clock: Option<Arc<dyn Clock>>,
}

impl SdkContextBuilder {
    pub fn new(identity: DeviceIdentity) -> Self {
        SdkContextBuilder {
            identity,
            config: SdkConfig::default(),
            client: None,
            store: None,
            clock: None,
        }
    }

    pub fn config(mut self, config: SdkConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses a custom HTTP client instead of the reqwest default.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Persists session totals in `store` (in memory by default).
    pub fn session_store(mut self, store: Box<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the context. Credentials are checked per request, not here.
    pub fn build(self) -> SdkResult<SdkContext> {
        self.config.validate()?;

        let client = match self.client {
            Some(client) => client,
            None => default_client(&self.config)?,
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let store = self
            .store
            .unwrap_or_else(|| Box::new(MemoryStore::new()));

        let session = Arc::new(Mutex::new(Session::new(store, Arc::clone(&clock))));
        let cache = SharedDiskCache::new(&self.config.cache_dir, self.config.precache_size);
        let dismissals = DismissLog::new(Arc::clone(&clock));

        Ok(SdkContext {
            inner: Arc::new(ContextInner {
                config: self.config,
                identity: self.identity,
                client,
                clock,
                session,
                cache,
                dismissals,
                cookies: ConversionCookies::new(),
            }),
        })
    }
}

#[cfg(feature = "http")]
fn default_client(config: &SdkConfig) -> SdkResult<Arc<dyn HttpClient>> {
    Ok(Arc::new(ReqwestClient::new(config)?))
}

#[cfg(not(feature = "http"))]
fn default_client(_config: &SdkConfig) -> SdkResult<Arc<dyn HttpClient>> {
    Err(ConfigurationError::MissingHttpClient.into())
}
