// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use super::payload::Content;

/// Capabilities the host application lends to the SDK.
///
/// The SDK never owns host UI objects. A host that has gone away answers
/// `false` and the SDK treats the action as failed.
pub trait HostHandle: Send + Sync {
    /// Shows content. Renderer events must later be routed back with `tag`.
    fn display_content(&self, content: &Content, tag: &str) -> bool;

    /// Opens a URL outside the SDK (browser, store app).
    fn launch_url(&self, url: &str) -> bool;

    /// Whether some installed handler accepts `scheme` URLs.
    fn can_open_scheme(&self, _scheme: &str) -> bool {
        true
    }
}
