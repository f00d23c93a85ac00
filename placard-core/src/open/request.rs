// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Open Request
//!
//! Announces a new game session. Sending starts a session; the signed call
//! reports the accumulated play time (`ssum`) and session count (`scount`).
//! A successful response may list `precache` URLs which are fetched into
//! the disk cache through a [`PrefetchQueue`].
//!
//! # Example
//!
//! ```ignore
//! let mut open = OpenRequest::new(&ctx)?.with_delegate(delegate);
//! open.send();
//! open.complete().await;   // success, then prefetch_finished
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::prefetch::{PrefetchOutcome, PrefetchQueue};
use crate::api::{ApiRequest, JsonObject, RequestError, RequestSpec};
use crate::config::ConfigurationError;
use crate::context::SdkContext;
use crate::signer::Params;

/// Endpoint for session opens.
pub const OPEN_ENDPOINT: &str = "/v3/publisher/open/";

/// Receives open request callbacks. Every method is optional.
#[allow(unused_variables)]
pub trait OpenDelegate: Send + Sync {
    fn request_succeeded(&self, request: &OpenRequest, response: &JsonObject) {}
    fn request_failed(&self, request: &OpenRequest, error: &RequestError) {}
    /// Every queued precache task has completed.
    fn prefetch_finished(&self, request: &OpenRequest) {}
}

/// Session-opening API call with precache support.
pub struct OpenRequest {
    ctx: SdkContext,
    api: ApiRequest,
    delegate: Option<Arc<dyn OpenDelegate>>,
    queue: PrefetchQueue,
    start_precaching_immediately: bool,
    prefetched: Vec<PrefetchOutcome>,
}

impl OpenRequest {
    /// Creates the request and opens the precache when enabled.
    pub fn new(ctx: &SdkContext) -> Result<Self, ConfigurationError> {
        let session = ctx.session();
        let spec = RequestSpec::endpoint(ctx, OPEN_ENDPOINT).with_param_provider(move || {
            let session = session.lock();
            let mut params = Params::new();
            params.insert("ssum".into(), session.total_time().to_string());
            params.insert("scount".into(), session.session_count().to_string());
            params
        });
        let api = ApiRequest::new(ctx, spec)?;

        if ctx.config().precache_enabled {
            if let Err(e) = ctx.cache().open() {
                warn!(error = %e, "could not open precache");
            }
        }

        Ok(OpenRequest {
            ctx: ctx.clone(),
            api,
            delegate: None,
            queue: PrefetchQueue::new(ctx.client(), ctx.cache().clone()),
            start_precaching_immediately: true,
            prefetched: Vec::new(),
        })
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn OpenDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// When false, [`complete`](Self::complete) leaves the queue filled and
    /// [`start_precaching`](Self::start_precaching) must be awaited later.
    pub fn set_start_precaching_immediately(&mut self, immediately: bool) {
        self.start_precaching_immediately = immediately;
    }

    pub fn api(&self) -> &ApiRequest {
        &self.api
    }

    pub fn queue(&self) -> &PrefetchQueue {
        &self.queue
    }

    /// Outcomes of the precache tasks run so far.
    pub fn prefetched(&self) -> &[PrefetchOutcome] {
        &self.prefetched
    }

    /// Starts a session and sends the request.
    pub fn send(&mut self) {
        self.ctx.session().lock().start();
        self.api.send();
    }

    /// Waits for the response, notifies the delegate and, unless deferred,
    /// runs the precache queue to completion.
    pub async fn complete(&mut self) {
        let Some(outcome) = self.api.outcome().await else {
            return;
        };
        match outcome {
            Ok(response) => {
                self.handle_success(&response);
                if self.start_precaching_immediately {
                    self.start_precaching().await;
                }
            }
            Err(e) => {
                warn!(error = %e, "open request failed");
                self.notify(|d, r| d.request_failed(r, &e));
            }
        }
    }

    /// Drains the precache queue. Does nothing when it is empty.
    pub async fn start_precaching(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let outcomes = self.queue.drain(|outcome| {
            debug!(url = %outcome.url, status = outcome.status, "precache task done");
        })
        .await;
        self.prefetched.extend(outcomes);
        info!(count = self.prefetched.len(), "precache finished");
        self.notify(|d, r| d.prefetch_finished(r));
    }

    /// Cancels the API call and any remaining precache work.
    pub fn cancel(&self) {
        self.api.cancel();
        self.queue.cancel();
    }

    fn handle_success(&mut self, response: &JsonObject) {
        if self.ctx.config().precache_enabled {
            if let Some(Value::Array(urls)) = response.get("precache") {
                self.queue.clear();
                for url in urls.iter().filter_map(Value::as_str) {
                    self.queue.enqueue(url);
                }
            }
        }

        if self.queue.is_empty() {
            if let Err(e) = self.ctx.cache().close() {
                warn!(error = %e, "could not close precache");
            }
        }

        self.ctx.session().lock().start_and_reset();
        self.notify(|d, r| d.request_succeeded(r, response));
    }

    fn notify(&self, f: impl FnOnce(&dyn OpenDelegate, &OpenRequest)) {
        if let Some(delegate) = &self.delegate {
            f(delegate.as_ref(), self);
        }
    }
}

impl std::fmt::Debug for OpenRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRequest")
            .field("queued", &self.queue.len())
            .field("start_precaching_immediately", &self.start_precaching_immediately)
            .finish_non_exhaustive()
    }
}
