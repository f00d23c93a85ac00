// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Link Loader
//!
//! Resolves a click-through URL by following its redirect chain, then asks
//! the host to launch the final location. Store links (`market:`) stop the
//! chain because the transport does not speak that scheme; when the host
//! cannot open them either, the web store page is launched instead.
//!
//! # Example
//!
//! ```ignore
//! let mut loader = LinkLoader::new(&ctx, host).with_delegate(delegate);
//! loader.set_target_url("https://click.example/abc");
//! loader.open()?;
//! loader.complete().await;
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use crate::content::HostHandle;
use crate::context::SdkContext;
use crate::network::{AsyncTransport, HttpMethod, TransportError, TransportResponse};

/// Scheme of store links.
pub const MARKET_SCHEME: &str = "market";

/// Web store page used when the host cannot open `market:` links.
pub const MARKET_URL_TEMPLATE: &str = "http://play.google.com/store/apps/details?id=";

/// Receives the loader's single completion.
#[allow(unused_variables)]
pub trait LinkLoaderDelegate: Send + Sync {
    fn loader_finished(&self, loader: &LinkLoader) {}
    fn loader_failed(&self, loader: &LinkLoader) {}
}

/// Follows a link and launches where it ends up.
pub struct LinkLoader {
    ctx: SdkContext,
    host: Arc<dyn HostHandle>,
    delegate: Option<Arc<dyn LinkLoaderDelegate>>,
    target: Option<String>,
    callback: Option<String>,
    open_final_url: bool,
    transport: Option<AsyncTransport>,
    loading: bool,
}

impl LinkLoader {
    pub fn new(ctx: &SdkContext, host: Arc<dyn HostHandle>) -> Self {
        LinkLoader {
            ctx: ctx.clone(),
            host,
            delegate: None,
            target: None,
            callback: None,
            open_final_url: true,
            transport: None,
            loading: false,
        }
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn LinkLoaderDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn set_target_url(&mut self, url: impl Into<String>) {
        self.target = Some(url.into());
    }

    /// The URL to open. After a successful load this is the final location.
    pub fn target_url(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Opaque renderer callback id carried alongside the load.
    pub fn set_callback(&mut self, callback: impl Into<String>) {
        self.callback = Some(callback.into());
    }

    pub fn callback(&self) -> Option<&str> {
        self.callback.as_deref()
    }

    /// When false the final URL is resolved but not launched.
    pub fn set_open_final_url(&mut self, open: bool) {
        self.open_final_url = open;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Starts resolving the target.
    ///
    /// Without a target the loader finishes immediately.
    pub fn open(&mut self) -> Result<(), TransportError> {
        let Some(target) = self.target.clone().filter(|t| !t.is_empty()) else {
            self.notify(|d, l| d.loader_finished(l));
            return Ok(());
        };

        info!(url = %target, "opening link");
        let mut transport = AsyncTransport::new(self.ctx.client());
        transport.set_method(HttpMethod::Get);
        transport.set_max_redirects(self.ctx.config().link_max_redirects);
        transport.execute(&target)?;

        self.transport = Some(transport);
        self.loading = true;
        Ok(())
    }

    /// Waits for the redirect chain and reports the outcome.
    pub async fn complete(&mut self) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        let Some(outcome) = transport.finished().await else {
            return;
        };

        match outcome {
            Ok(response) if response.status < 300 => self.finish(&response),
            Ok(response) => {
                warn!(url = ?self.target, status = response.status, "link failed");
                self.fail();
            }
            Err(e) => {
                warn!(url = ?self.target, error = %e, "link failed");
                self.fail();
            }
        }
    }

    /// Drops the delegate and cancels any in-flight load.
    pub fn invalidate(&mut self) {
        self.delegate = None;
        self.loading = false;
        if let Some(transport) = &self.transport {
            transport.cancel();
        }
    }

    fn finish(&mut self, response: &TransportResponse) {
        if !self.loading {
            return;
        }
        self.loading = false;

        if let Some(last) = response.last_redirect() {
            self.target = Some(last.to_string());
        }
        debug!(url = ?self.target, "final link location");

        if self.open_final_url {
            if let Some(target) = self.target.clone().filter(|t| !t.is_empty()) {
                self.launch(&target);
            }
        }
        self.notify(|d, l| d.loader_finished(l));
        self.invalidate();
    }

    fn fail(&mut self) {
        self.notify(|d, l| d.loader_failed(l));
        self.invalidate();
    }

    fn launch(&self, target: &str) {
        let launched = if target.starts_with("market:") && !self.host.can_open_scheme(MARKET_SCHEME) {
            match market_fallback(target) {
                Some(web) => {
                    debug!(url = %web, "store app unavailable, using web store");
                    self.host.launch_url(&web)
                }
                None => self.host.launch_url(target),
            }
        } else {
            self.host.launch_url(target)
        };
        if !launched {
            warn!(url = %target, "host could not launch URL");
        }
    }

    fn notify(&self, f: impl FnOnce(&dyn LinkLoaderDelegate, &LinkLoader)) {
        if let Some(delegate) = &self.delegate {
            f(delegate.as_ref(), self);
        }
    }
}

impl std::fmt::Debug for LinkLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkLoader")
            .field("target", &self.target)
            .field("callback", &self.callback)
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

/// Web store URL for a `market:` link's `id` query parameter.
pub fn market_fallback(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let id = parsed
        .query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())?;
    Some(format!("{MARKET_URL_TEMPLATE}{id}"))
}
