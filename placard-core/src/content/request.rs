// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content Request
//!
//! Drives one placement through `Initialized → Preloading → Preloaded →
//! DisplayingContent → Done`. `preload()` stops at `Preloaded`; `send()`
//! continues to display. The state never moves backwards.
//!
//! # Example
//!
//! ```ignore
//! let mut request = ContentRequest::new(&ctx, "level_complete", host)?
//!     .with_delegate(delegate);
//! request.preload();
//! request.complete().await;   // Preloaded
//! request.send();             // DisplayingContent
//! request.handle_event(&tag, RendererEvent::Dismissed(DismissType::CloseButton));
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::host::HostHandle;
use super::payload::Content;
use super::rewards::{parse_purchases, parse_rewards, Purchase, Reward};
use super::state::RequestState;
use crate::api::{ApiRequest, JsonObject, RequestError, RequestSpec};
use crate::config::ConfigurationError;
use crate::context::SdkContext;
use crate::signer::Params;

/// Endpoint for content requests.
pub const CONTENT_ENDPOINT: &str = "/v3/publisher/content/";

/// Why displayed content went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissType {
    /// The content template closed itself.
    ContentUnit,
    /// The user hit the close button.
    CloseButton,
    /// The host application closed it.
    Application,
    /// There was nothing to show, usually after an error.
    NoContent,
}

/// Event reported back by the renderer for a displayed content tag.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererEvent {
    Shown,
    Loaded,
    Dismissed(DismissType),
    Failed(String),
    /// Raw template context holding a `rewards` array.
    RewardUnlocked { context: Value },
    /// Raw template context holding a `purchases` array.
    PurchaseRequested {
        context: Value,
        callback: Option<String>,
    },
}

/// Receives content request callbacks. Every method is optional.
#[allow(unused_variables)]
pub trait ContentDelegate: Send + Sync {
    fn request_succeeded(&self, request: &ContentRequest, response: &JsonObject) {}
    fn request_failed(&self, request: &ContentRequest, error: &RequestError) {}
    fn will_get_content(&self, request: &ContentRequest) {}
    fn did_preload(&self, request: &ContentRequest) {}
    fn will_display_content(&self, request: &ContentRequest, content: &Content) {}
    fn did_display_content(&self, request: &ContentRequest, content: &Content) {}
    fn did_show_content(&self, request: &ContentRequest) {}
    fn did_load_content(&self, request: &ContentRequest) {}
    fn did_dismiss_content(&self, request: &ContentRequest, kind: DismissType) {}
    fn did_fail(&self, request: &ContentRequest, error: &str) {}
    fn unlocked_reward(&self, request: &ContentRequest, reward: &Reward) {}
    fn should_make_purchase(&self, request: &ContentRequest, purchase: &Purchase) {}
}

/// Loads and displays the content of one placement.
pub struct ContentRequest {
    ctx: SdkContext,
    placement: String,
    host: Arc<dyn HostHandle>,
    delegate: Option<Arc<dyn ContentDelegate>>,
    state: RequestState,
    target: RequestState,
    api: Option<ApiRequest>,
    content: Option<Content>,
    content_tag: Option<String>,
}

impl ContentRequest {
    /// Creates a request. Fails if the publisher token or secret is empty.
    pub fn new(
        ctx: &SdkContext,
        placement: impl Into<String>,
        host: Arc<dyn HostHandle>,
    ) -> Result<Self, ConfigurationError> {
        ctx.identity().validate()?;
        Ok(ContentRequest {
            ctx: ctx.clone(),
            placement: placement.into(),
            host,
            delegate: None,
            state: RequestState::Initialized,
            target: RequestState::Initialized,
            api: None,
            content: None,
            content_tag: None,
        })
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn ContentDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn placement(&self) -> &str {
        &self.placement
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn target_state(&self) -> RequestState {
        self.target
    }

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    /// Tag the renderer must use when routing events back.
    pub fn content_tag(&self) -> Option<&str> {
        self.content_tag.as_deref()
    }

    /// Underlying API call, once loading has started.
    pub fn api_request(&self) -> Option<&ApiRequest> {
        self.api.as_ref()
    }

    /// Moves the state forward. Earlier or equal states are ignored.
    pub fn set_state(&mut self, state: RequestState) {
        if !self.state.advance(state) {
            debug!(current = ?self.state, requested = ?state, "ignoring state regression");
        }
    }

    /// Loads content without displaying it.
    pub fn preload(&mut self) {
        self.target = RequestState::Preloaded;
        self.continue_loading();
    }

    /// Loads content if needed and displays it.
    pub fn send(&mut self) {
        self.target = RequestState::DisplayingContent;
        self.notify(|d, r| d.will_get_content(r));
        self.continue_loading();
    }

    /// Waits for the in-flight load and advances the state machine.
    pub async fn complete(&mut self) {
        let Some(api) = self.api.as_mut() else {
            return;
        };
        let Some(outcome) = api.outcome().await else {
            return;
        };
        match outcome {
            Ok(response) => self.handle_success(response),
            Err(e) => {
                warn!(placement = %self.placement, error = %e, "content request failed");
                self.notify(|d, r| d.request_failed(r, &e));
                self.set_state(RequestState::Done);
            }
        }
    }

    /// Forces `Done` and cancels any in-flight load.
    pub fn finish(&mut self) {
        self.set_state(RequestState::Done);
        if let Some(api) = &self.api {
            api.cancel();
        }
    }

    /// Routes a renderer event. Events for other tags are ignored.
    ///
    /// Returns whether the event belonged to this request.
    pub fn handle_event(&mut self, tag: &str, event: RendererEvent) -> bool {
        if self.content_tag.as_deref() != Some(tag) {
            return false;
        }

        match event {
            RendererEvent::Shown => self.notify(|d, r| d.did_show_content(r)),
            RendererEvent::Loaded => self.notify(|d, r| d.did_load_content(r)),
            RendererEvent::Dismissed(kind) => {
                self.ctx.dismissals().record_dismissal();
                self.notify(|d, r| d.did_dismiss_content(r, kind));
                self.set_state(RequestState::Done);
            }
            RendererEvent::Failed(error) => {
                warn!(placement = %self.placement, error = %error, "renderer failed");
                self.notify(|d, r| d.did_fail(r, &error));
                self.set_state(RequestState::Done);
            }
            RendererEvent::RewardUnlocked { context } => {
                for reward in parse_rewards(&context, self.ctx.identity()) {
                    info!(reward = %reward.name, quantity = reward.quantity, "reward unlocked");
                    self.notify(|d, r| d.unlocked_reward(r, &reward));
                }
            }
            RendererEvent::PurchaseRequested { context, callback } => {
                let purchases = parse_purchases(&context, self.ctx.identity(), callback.as_deref());
                for purchase in purchases {
                    self.ctx
                        .cookies()
                        .set(&purchase.product, purchase.cookie.clone());
                    self.notify(|d, r| d.should_make_purchase(r, &purchase));
                }
            }
        }
        true
    }

    fn continue_loading(&mut self) {
        match self.state {
            RequestState::Initialized => self.load_content(),
            RequestState::Preloaded => self.show_content(),
            _ => {}
        }
    }

    fn load_content(&mut self) {
        let preload = self.target == RequestState::Preloaded;
        let placement = self.placement.clone();
        let session = self.ctx.session();

        let spec = RequestSpec::endpoint(&self.ctx, CONTENT_ENDPOINT).with_param_provider(
            move || {
                let mut params = Params::new();
                params.insert("placement_id".into(), placement);
                params.insert("preload".into(), if preload { "1" } else { "0" }.into());
                params.insert("stime".into(), session.lock().session_time().to_string());
                params
            },
        );

        let mut api = match ApiRequest::new(&self.ctx, spec) {
            Ok(api) => api,
            Err(e) => {
                let e = RequestError::from(e);
                self.notify(|d, r| d.request_failed(r, &e));
                self.set_state(RequestState::Done);
                return;
            }
        };

        self.set_state(RequestState::Preloading);
        api.send();
        self.api = Some(api);
        if preload {
            self.notify(|d, r| d.will_get_content(r));
        }
    }

    fn handle_success(&mut self, response: JsonObject) {
        self.notify(|d, r| d.request_succeeded(r, &response));

        if response.is_empty() {
            debug!(placement = %self.placement, "no content for placement");
            self.set_state(RequestState::Done);
            return;
        }

        let content = Content::from_response(&response);
        if content.has_target() {
            self.set_state(RequestState::Preloaded);
        } else {
            self.set_state(RequestState::Done);
        }
        self.content = Some(content);

        if self.state == RequestState::Preloaded && self.target == RequestState::Preloaded {
            self.notify(|d, r| d.did_preload(r));
        }
        self.continue_loading();
    }

    fn show_content(&mut self) {
        if !matches!(
            self.target,
            RequestState::DisplayingContent | RequestState::Done
        ) {
            return;
        }
        let Some(content) = self.content.clone() else {
            return;
        };

        self.notify(|d, r| d.will_display_content(r, &content));
        self.set_state(RequestState::DisplayingContent);

        let tag = format!("content-view-{}", Uuid::new_v4());
        self.content_tag = Some(tag.clone());

        if !self.host.display_content(&content, &tag) {
            warn!(placement = %self.placement, "host could not display content");
            self.notify(|d, r| d.did_fail(r, "host unavailable"));
            self.set_state(RequestState::Done);
            return;
        }
        self.notify(|d, r| d.did_display_content(r, &content));
    }

    fn notify(&self, f: impl FnOnce(&dyn ContentDelegate, &ContentRequest)) {
        if let Some(delegate) = &self.delegate {
            f(delegate.as_ref(), self);
        }
    }
}

impl std::fmt::Debug for ContentRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentRequest")
            .field("placement", &self.placement)
            .field("state", &self.state)
            .field("target", &self.target)
            .field("content_tag", &self.content_tag)
            .finish()
    }
}
