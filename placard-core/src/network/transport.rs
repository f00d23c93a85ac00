// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Async Transport
//!
//! Executes exactly one HTTP request on a spawned worker and hands the result
//! back through a single-shot channel. The owner awaits [`AsyncTransport::finished`]
//! (or [`AsyncTransport::complete`]) on its own task, which is where delegate
//! callbacks run.
//!
//! # Example
//!
//! ```ignore
//! use placard_core::network::{AsyncTransport, MockHttpClient};
//!
//! let mut transport = AsyncTransport::new(Arc::new(MockHttpClient::new()));
//! transport.set_max_redirects(3);
//! transport.execute("https://example.com/")?;
//! if let Some(Ok(response)) = transport.finished().await {
//!     println!("{} bytes", response.body.len());
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use base64::{engine::general_purpose::STANDARD, Engine};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use url::Url;

use super::client::{HttpClient, HttpMethod, HttpRequest};
use super::error::TransportError;
use super::redirect::{
    is_redirect_status, RedirectDecision, RedirectLog, RedirectTracker, SchemeRegistry,
    UNLIMITED_REDIRECTS,
};

/// Lifecycle of one transport. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// Created, not yet executed.
    Idle,
    /// Worker running.
    Running,
    /// Worker produced a response.
    Finished,
    /// Cancelled by the owner.
    Cancelled,
    /// Worker produced an error.
    Failed,
}

impl TransportState {
    fn rank(&self) -> u8 {
        match self {
            TransportState::Idle => 0,
            TransportState::Running => 1,
            TransportState::Finished | TransportState::Cancelled | TransportState::Failed => 2,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.rank() == 2
    }
}

fn advance(state: &Mutex<TransportState>, next: TransportState) {
    let mut current = state.lock();
    if next.rank() > current.rank() {
        *current = next;
    }
}

/// Credentials sent as `Authorization: Basic` on every hop.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    /// Returns `None` unless both parts are non-empty.
    pub fn new(username: &str, password: &str) -> Option<Self> {
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some(BasicAuth {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn header_value(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", encoded)
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Request shape and redirect policy for one execution.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub method: HttpMethod,
    pub form: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub max_redirects: u32,
    pub schemes: SchemeRegistry,
    pub auth: Option<BasicAuth>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        TransportOptions {
            method: HttpMethod::Get,
            form: Vec::new(),
            headers: Vec::new(),
            max_redirects: UNLIMITED_REDIRECTS,
            schemes: SchemeRegistry::default(),
            auth: None,
        }
    }
}

/// Final outcome of a transport that reached a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// Final status. An unfollowed redirect reads as 200 once a location
    /// has been recorded.
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub redirects: RedirectLog,
    /// URL of the last hop actually requested.
    pub final_url: Url,
}

impl TransportResponse {
    /// Last proposed redirect location, followed or not.
    pub fn last_redirect(&self) -> Option<&str> {
        self.redirects.last()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Receives the single completion of a transport.
pub trait TransportDelegate {
    fn request_finished(&self, response: &TransportResponse);
    fn request_failed(&self, error: &TransportError);
}

/// Runs the hop loop: request, inspect, follow or stop.
pub(crate) async fn perform(
    client: &dyn HttpClient,
    url: Url,
    options: &TransportOptions,
    cancelled: &AtomicBool,
) -> Result<TransportResponse, TransportError> {
    let mut tracker = RedirectTracker::new(options.max_redirects, options.schemes.clone());
    let mut current = url;
    let mut method = options.method;
    let mut form = options.form.clone();

    loop {
        if cancelled.load(Ordering::SeqCst) {
            return Err(TransportError::Cancelled);
        }

        let mut headers = options.headers.clone();
        if let Some(auth) = &options.auth {
            headers.push(("Authorization".to_string(), auth.header_value()));
        }

        let request = HttpRequest {
            method,
            url: current.clone(),
            headers,
            form: form.clone(),
        };
        let response = client.execute(request).await?;

        match tracker.decide(&current, &response) {
            RedirectDecision::Follow(next) => {
                debug!(from = %current, to = %next, status = response.status, "following redirect");
                current = next;
                method = HttpMethod::Get;
                form.clear();
            }
            decision => {
                let redirects = tracker.into_log();
                let mut status = response.status;
                // Only an unfollowed redirect is normalised. A 3xx without
                // a Location, such as 304, keeps its status.
                if decision == RedirectDecision::Stop
                    && is_redirect_status(status)
                    && response.header("location").is_some()
                    && !redirects.is_empty()
                {
                    status = 200;
                }
                return Ok(TransportResponse {
                    status,
                    headers: response.headers,
                    body: response.body,
                    redirects,
                    final_url: current,
                });
            }
        }
    }
}

type Outcome = Result<TransportResponse, TransportError>;

/// Cancellable, single-use HTTP execution on a worker task.
pub struct AsyncTransport {
    client: Arc<dyn HttpClient>,
    options: TransportOptions,
    state: Arc<Mutex<TransportState>>,
    cancelled: Arc<AtomicBool>,
    receiver: Option<oneshot::Receiver<Outcome>>,
    started: bool,
}

impl AsyncTransport {
    /// Creates a new transport with default GET options.
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self::with_options(client, TransportOptions::default())
    }

    pub fn with_options(client: Arc<dyn HttpClient>, options: TransportOptions) -> Self {
        AsyncTransport {
            client,
            options,
            state: Arc::new(Mutex::new(TransportState::Idle)),
            cancelled: Arc::new(AtomicBool::new(false)),
            receiver: None,
            started: false,
        }
    }

    pub fn set_method(&mut self, method: HttpMethod) {
        self.options.method = method;
    }

    /// Replaces the POST body fields.
    pub fn set_post_params(&mut self, fields: Vec<(String, String)>) {
        self.options.form = fields;
    }

    pub fn set_max_redirects(&mut self, max: u32) {
        self.options.max_redirects = max;
    }

    pub fn register_scheme(&mut self, scheme: &str) {
        self.options.schemes.register(scheme);
    }

    /// Sets Basic credentials. Ignored unless both are non-empty.
    pub fn set_credentials(&mut self, username: &str, password: &str) {
        self.options.auth = BasicAuth::new(username, password);
    }

    pub fn state(&self) -> TransportState {
        *self.state.lock()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Shared cancel flag for side-effect checks outside the transport.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Starts the request on a worker and returns immediately.
    ///
    /// A transport executes at most once.
    pub fn execute(&mut self, url: &str) -> Result<(), TransportError> {
        if self.started {
            return Err(TransportError::AlreadyStarted);
        }
        let url = Url::parse(url).map_err(|e| TransportError::InvalidUrl(format!("{url}: {e}")))?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::NoRuntime(e.to_string()))?;

        self.started = true;
        advance(&self.state, TransportState::Running);

        let (tx, rx) = oneshot::channel();
        let client = Arc::clone(&self.client);
        let options = self.options.clone();
        let cancelled = Arc::clone(&self.cancelled);
        let state = Arc::clone(&self.state);

        runtime.spawn(async move {
            let started = Instant::now();
            let result = perform(client.as_ref(), url.clone(), &options, &cancelled).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let next = if cancelled.load(Ordering::SeqCst) {
                TransportState::Cancelled
            } else if result.is_ok() {
                TransportState::Finished
            } else {
                TransportState::Failed
            };
            advance(&state, next);

            match &result {
                Ok(response) => {
                    info!(url = %url, status = response.status, elapsed_ms, "request finished")
                }
                Err(e) => warn!(url = %url, error = %e, elapsed_ms, "request failed"),
            }
            // Receiver may be gone if the owner was dropped.
            let _ = tx.send(result);
        });

        self.receiver = Some(rx);
        Ok(())
    }

    /// Marks the transport cancelled. In-flight I/O may finish but its
    /// result is discarded.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        advance(&self.state, TransportState::Cancelled);
    }

    /// Waits for the worker's result.
    ///
    /// Returns `None` when cancelled, never started, or already consumed.
    pub async fn finished(&mut self) -> Option<Outcome> {
        let receiver = self.receiver.take()?;
        let result = receiver.await;
        if self.is_cancelled() {
            return None;
        }
        Some(result.unwrap_or_else(|e| Err(TransportError::WorkerLost(e.to_string()))))
    }

    /// Waits for the result and reports it to `delegate` at most once.
    pub async fn complete(&mut self, delegate: &dyn TransportDelegate) {
        match self.finished().await {
            Some(Ok(response)) => delegate.request_finished(&response),
            Some(Err(e)) => delegate.request_failed(&e),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_never_regresses() {
        let state = Mutex::new(TransportState::Idle);
        advance(&state, TransportState::Running);
        advance(&state, TransportState::Finished);
        advance(&state, TransportState::Running);
        advance(&state, TransportState::Cancelled);
        assert_eq!(*state.lock(), TransportState::Finished);
    }

    #[test]
    fn test_basic_auth_requires_both_parts() {
        assert!(BasicAuth::new("user", "").is_none());
        assert!(BasicAuth::new("", "pass").is_none());
        let auth = BasicAuth::new("user", "pass").unwrap();
        assert_eq!(auth.header_value(), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_execute_without_runtime_fails() {
        let client = Arc::new(super::super::mock::MockHttpClient::new());
        let mut transport = AsyncTransport::new(client);
        let err = transport.execute("https://a.test/").unwrap_err();
        assert!(matches!(err, TransportError::NoRuntime(_)));
        assert_eq!(transport.state(), TransportState::Idle);
    }
}
