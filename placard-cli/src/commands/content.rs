// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content Command
//!
//! Loads the content of a placement and prints it instead of rendering it.

use std::sync::Arc;

use anyhow::{bail, Result};
use parking_lot::Mutex;
use placard_core::{
    Content, ContentDelegate, ContentRequest, DismissType, HostHandle, JsonObject, RendererEvent,
    RequestError, RequestState,
};
use tracing::warn;

use crate::config::CliConfig;
use crate::display;

/// Host that prints content and URLs to the terminal.
struct TerminalHost;

impl HostHandle for TerminalHost {
    fn display_content(&self, content: &Content, tag: &str) -> bool {
        let url = content.url.as_ref().map(|u| u.as_str()).unwrap_or("-");
        display::field("url", url);
        display::field("tag", tag);
        display::field("transition", &format!("{:?}", content.transition));
        if !content.close_delay.is_zero() {
            display::field("close delay", &format!("{:?}", content.close_delay));
        }
        true
    }

    fn launch_url(&self, url: &str) -> bool {
        display::info(&format!("Open: {}", url));
        true
    }
}

#[derive(Default)]
struct ContentReport {
    failure: Mutex<Option<String>>,
}

impl ContentDelegate for ContentReport {
    fn request_failed(&self, _request: &ContentRequest, error: &RequestError) {
        *self.failure.lock() = Some(error.to_string());
    }

    fn request_succeeded(&self, request: &ContentRequest, response: &JsonObject) {
        if response.is_empty() {
            display::info(&format!("No content for placement '{}'", request.placement()));
        }
    }

    fn did_preload(&self, request: &ContentRequest) {
        display::success(&format!("Preloaded '{}'", request.placement()));
    }

    fn did_display_content(&self, request: &ContentRequest, _content: &Content) {
        display::success(&format!("Displayed '{}'", request.placement()));
    }

    fn did_fail(&self, _request: &ContentRequest, error: &str) {
        *self.failure.lock() = Some(error.to_string());
    }
}

/// Requests content for `placement`, optionally stopping after preload.
pub async fn run(config: &CliConfig, placement: &str, preload_only: bool) -> Result<()> {
    let ctx = config.context()?;
    let report = Arc::new(ContentReport::default());

    let mut request =
        ContentRequest::new(&ctx, placement, Arc::new(TerminalHost))?.with_delegate(report.clone());
    if preload_only {
        request.preload();
    } else {
        request.send();
    }
    request.complete().await;

    // Nothing renders in a terminal, so close the content right away.
    if request.state() == RequestState::DisplayingContent {
        if let Some(tag) = request.content_tag().map(str::to_string) {
            request.handle_event(&tag, RendererEvent::Dismissed(DismissType::Application));
        }
    }
    request.finish();
    if let Err(e) = ctx.shutdown() {
        warn!(error = %e, "could not persist session state");
    }

    if let Some(failure) = report.failure.lock().take() {
        bail!("Content request failed: {}", failure);
    }
    Ok(())
}
