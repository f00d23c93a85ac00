// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Click Command
//!
//! Follows a click-through URL and prints where it ends up.

use std::sync::Arc;

use anyhow::{bail, Result};
use parking_lot::Mutex;
use placard_core::{Content, HostHandle, LinkLoader, LinkLoaderDelegate};

use crate::config::CliConfig;
use crate::display;

/// Host that can only print; content display is refused.
struct PrintHost;

impl HostHandle for PrintHost {
    fn display_content(&self, _content: &Content, _tag: &str) -> bool {
        false
    }

    fn launch_url(&self, url: &str) -> bool {
        display::info(&format!("Open: {}", url));
        true
    }

    fn can_open_scheme(&self, scheme: &str) -> bool {
        matches!(scheme, "http" | "https")
    }
}

enum Resolution {
    Finished(String),
    Failed,
}

#[derive(Default)]
struct ClickReport {
    resolved: Mutex<Option<Resolution>>,
}

impl LinkLoaderDelegate for ClickReport {
    fn loader_finished(&self, loader: &LinkLoader) {
        *self.resolved.lock() = Some(Resolution::Finished(
            loader.target_url().unwrap_or_default().to_string(),
        ));
    }

    fn loader_failed(&self, _loader: &LinkLoader) {
        *self.resolved.lock() = Some(Resolution::Failed);
    }
}

/// Resolves `url`. With `launch`, the final URL is handed to the host.
pub async fn run(config: &CliConfig, url: &str, launch: bool) -> Result<()> {
    let ctx = config.context()?;
    let report = Arc::new(ClickReport::default());

    let mut loader = LinkLoader::new(&ctx, Arc::new(PrintHost)).with_delegate(report.clone());
    loader.set_target_url(url);
    loader.set_open_final_url(launch);
    loader.open()?;
    loader.complete().await;

    let resolved = report.resolved.lock().take();
    match resolved {
        Some(Resolution::Finished(target)) => {
            display::success("Link resolved");
            display::field("final", &target);
            Ok(())
        }
        Some(Resolution::Failed) => bail!("Could not resolve {}", url),
        None => bail!("Link loader stopped without a result"),
    }
}
