// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network + Transport Layer
//!
//! # Architecture
//!
//! - **HttpClient trait**: executes one HTTP hop, no automatic redirects
//! - **Redirect policy**: scheme registry, redirect log, per-execution cap
//! - **AsyncTransport**: spawns the hop loop on a worker and delivers the
//!   result once through a single-shot channel
//!
//! `MockHttpClient` is always compiled so hosts can test integrations.

mod client;
mod error;
mod mock;
mod redirect;
#[cfg(feature = "http")]
mod reqwest_client;
mod transport;

pub use client::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use error::TransportError;
pub use mock::MockHttpClient;
pub use redirect::{
    is_redirect_status, RedirectDecision, RedirectLog, RedirectTracker, SchemeRegistry,
    UNLIMITED_REDIRECTS,
};
#[cfg(feature = "http")]
pub use reqwest_client::ReqwestClient;
pub use transport::{
    AsyncTransport, BasicAuth, TransportDelegate, TransportOptions, TransportResponse,
    TransportState,
};
pub(crate) use transport::perform;
