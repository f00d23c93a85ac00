// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Request
//!
//! One authenticated call. Concrete request kinds differ only in their
//! [`RequestSpec`]: endpoint, HTTP method, extra signed parameters and POST
//! fields. Signing, transport and envelope handling are shared.
//!
//! # Example
//!
//! ```ignore
//! use placard_core::{ApiRequest, RequestSpec, SdkContext};
//!
//! let spec = RequestSpec::endpoint(&ctx, "/v3/publisher/open/");
//! let mut request = ApiRequest::new(&ctx, spec)?.with_delegate(delegate);
//! request.send();
//! request.complete().await;
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::envelope::{parse_envelope, JsonObject};
use super::error::{EnvelopeError, RequestError};
use crate::config::ConfigurationError;
use crate::context::SdkContext;
use crate::network::{AsyncTransport, HttpMethod, TransportError};
use crate::signer::{query_string, Params, RequestSigner};

/// Produces extra signed parameters. Called at most once per request.
pub type ParamProvider = Box<dyn FnOnce() -> Params + Send>;

/// What varies between request kinds.
pub struct RequestSpec {
    base_url: String,
    method: HttpMethod,
    additional: Option<ParamProvider>,
    post_params: Params,
}

impl RequestSpec {
    /// GET request against an absolute base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        RequestSpec {
            base_url: base_url.into(),
            method: HttpMethod::Get,
            additional: None,
            post_params: Params::new(),
        }
    }

    /// GET request against an endpoint slug on the configured API host.
    pub fn endpoint(ctx: &SdkContext, slug: &str) -> Self {
        Self::new(ctx.config().api_url(slug))
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Extra signed parameters known up front.
    pub fn with_params(self, params: Params) -> Self {
        self.with_param_provider(move || params)
    }

    /// Extra signed parameters computed lazily, on first signing.
    pub fn with_param_provider<F>(mut self, provider: F) -> Self
    where
        F: FnOnce() -> Params + Send + 'static,
    {
        self.additional = Some(Box::new(provider));
        self
    }

    /// Body fields, sent only when the method is POST.
    pub fn with_post_params(mut self, fields: Params) -> Self {
        self.post_params = fields;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }
}

impl fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSpec")
            .field("base_url", &self.base_url)
            .field("method", &self.method)
            .field("has_additional", &self.additional.is_some())
            .field("post_params", &self.post_params)
            .finish()
    }
}

/// Receives the outcome of an [`ApiRequest`].
pub trait ApiDelegate: Send + Sync {
    fn request_succeeded(&self, request: &ApiRequest, response: &JsonObject);
    fn request_failed(&self, request: &ApiRequest, error: &RequestError);
}

/// One authenticated API call.
pub struct ApiRequest {
    ctx: SdkContext,
    base_url: String,
    method: HttpMethod,
    post_params: Params,
    provider: Mutex<Option<ParamProvider>>,
    signed: OnceCell<Params>,
    full_url: OnceCell<String>,
    tag: Option<String>,
    delegate: Option<Arc<dyn ApiDelegate>>,
    transport: Option<AsyncTransport>,
    pending_failure: Option<RequestError>,
    cancelled: AtomicBool,
}

impl ApiRequest {
    /// Creates a request. Fails if the publisher token or secret is empty.
    pub fn new(ctx: &SdkContext, spec: RequestSpec) -> Result<Self, ConfigurationError> {
        ctx.identity().validate()?;

        Ok(ApiRequest {
            ctx: ctx.clone(),
            base_url: spec.base_url,
            method: spec.method,
            post_params: spec.post_params,
            provider: Mutex::new(spec.additional),
            signed: OnceCell::new(),
            full_url: OnceCell::new(),
            tag: None,
            delegate: None,
            transport: None,
            pending_failure: None,
            cancelled: AtomicBool::new(false),
        })
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn ApiDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn set_delegate(&mut self, delegate: Option<Arc<dyn ApiDelegate>>) {
        self.delegate = delegate;
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = Some(tag.into());
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn context(&self) -> &SdkContext {
        &self.ctx
    }

    /// Signed parameters, computed once per request.
    pub fn signed_params(&self) -> Result<&Params, RequestError> {
        self.signed.get_or_try_init(|| {
            let additional = self
                .provider
                .lock()
                .take()
                .map(|provide| provide())
                .unwrap_or_default();
            RequestSigner::new(self.ctx.identity())
                .sign(additional)
                .map_err(RequestError::from)
        })
    }

    /// `base?query`, computed once per request.
    pub fn url(&self) -> Result<&str, RequestError> {
        self.full_url
            .get_or_try_init(|| {
                let params = self.signed_params()?;
                Ok(format!("{}?{}", self.base_url, query_string(params)))
            })
            .map(String::as_str)
    }

    /// True once `send` has been called.
    pub fn is_sent(&self) -> bool {
        self.transport.is_some() || self.pending_failure.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Starts the call and returns immediately.
    ///
    /// Failures before the worker starts are held back and reported by
    /// [`complete`](Self::complete), like any other failure.
    pub fn send(&mut self) {
        if self.is_sent() {
            warn!(url = %self.base_url, "request already sent");
            return;
        }

        let url = match self.url().map(str::to_string) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = %self.base_url, error = %e, "could not build request URL");
                self.pending_failure = Some(e);
                return;
            }
        };

        let mut transport = AsyncTransport::new(self.ctx.client());
        transport.set_method(self.method);
        if self.method == HttpMethod::Post {
            transport.set_post_params(
                self.post_params
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            );
        }

        debug!(url = %self.base_url, method = self.method.as_str(), "sending request");
        match transport.execute(&url) {
            Ok(()) => self.transport = Some(transport),
            Err(e) => {
                warn!(url = %self.base_url, error = %e, "could not start transport");
                self.pending_failure = Some(e.into());
            }
        }
    }

    /// Aborts the call. No further outcome is reported.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(transport) = &self.transport {
            transport.cancel();
        }
    }

    /// Waits for the decoded `response` object.
    ///
    /// `None` means nothing should be reported: the request was cancelled,
    /// never sent, already consumed, or hit an internal failure that was
    /// logged instead.
    pub async fn outcome(&mut self) -> Option<Result<JsonObject, RequestError>> {
        if self.is_cancelled() {
            return None;
        }
        if let Some(err) = self.pending_failure.take() {
            return Some(Err(err));
        }

        let transport = self.transport.as_mut()?;
        let response = match transport.finished().await? {
            Ok(response) => response,
            Err(e) => return Some(Err(e.into())),
        };
        if self.is_cancelled() {
            return None;
        }

        if !response.is_success() {
            return Some(Err(TransportError::Status(response.status).into()));
        }

        match parse_envelope(&response.body) {
            Ok(payload) => Some(Ok(payload)),
            Err(EnvelopeError::Encoding(e)) => {
                warn!(url = %self.base_url, error = %e, "dropping undecodable response");
                None
            }
            Err(e) => Some(Err(e.into())),
        }
    }

    /// Waits for the outcome and reports it to the delegate.
    pub async fn complete(&mut self) {
        let Some(outcome) = self.outcome().await else {
            return;
        };
        let Some(delegate) = self.delegate.clone() else {
            return;
        };
        match outcome {
            Ok(response) => delegate.request_succeeded(self, &response),
            Err(e) => delegate.request_failed(self, &e),
        }
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("base_url", &self.base_url)
            .field("method", &self.method)
            .field("tag", &self.tag)
            .field("sent", &self.is_sent())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
