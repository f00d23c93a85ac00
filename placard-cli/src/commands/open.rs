// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Open Command
//!
//! Reports a session open and precaches the resources the API lists.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use placard_core::{JsonObject, OpenDelegate, OpenRequest, RequestError};
use tracing::warn;

use crate::config::CliConfig;
use crate::display;

#[derive(Default)]
struct OpenReport {
    failure: Mutex<Option<String>>,
}

impl OpenDelegate for OpenReport {
    fn request_succeeded(&self, request: &OpenRequest, response: &JsonObject) {
        display::success("Session opened");
        display::field("keys", &response.len().to_string());
        display::field("precache", &request.queue().len().to_string());
    }

    fn request_failed(&self, _request: &OpenRequest, error: &RequestError) {
        *self.failure.lock() = Some(error.to_string());
    }

    fn prefetch_finished(&self, request: &OpenRequest) {
        for outcome in request.prefetched() {
            let status = outcome.status.to_string();
            if outcome.stored {
                display::field(&status, &outcome.url);
            } else {
                display::warning(&format!("{} not cached ({})", outcome.url, status));
            }
        }
    }
}

/// Sends the open request and waits for precaching to finish.
pub async fn run(config: &CliConfig, skip_precache: bool) -> Result<()> {
    let ctx = config.context()?;
    let report = Arc::new(OpenReport::default());

    let mut request = OpenRequest::new(&ctx)?.with_delegate(report.clone());
    request.set_start_precaching_immediately(!skip_precache);
    request.send();
    request.complete().await;
    if let Err(e) = ctx.shutdown() {
        warn!(error = %e, "could not persist session state");
    }

    if let Some(failure) = report.failure.lock().take() {
        anyhow::bail!("Open request failed: {}", failure);
    }
    if skip_precache && !request.queue().is_empty() {
        display::info(&format!(
            "Skipped {} precache resources",
            request.queue().len()
        ));
    }
    Ok(())
}
