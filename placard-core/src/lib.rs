// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Placard Core Library
//!
//! Client-side SDK core for placement content: signed API requests, an
//! asynchronous redirect-aware transport, the content request lifecycle and
//! a sequential precache queue backed by a versioned disk cache.
//! All digests and nonces use the audited `ring` crate.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod content;
pub mod context;
pub mod error;
pub mod identity;
pub mod link_loader;
pub mod network;
pub mod open;
pub mod purchases;
pub mod session;
pub mod signer;

pub use api::{ApiDelegate, ApiRequest, EnvelopeError, JsonObject, RequestError, RequestSpec};
pub use cache::{CacheError, DiskCache, SharedDiskCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigurationError, SdkConfig};
pub use content::{
    Content, ContentDelegate, ContentRequest, DismissLog, DismissType, HostHandle, Purchase,
    RendererEvent, RequestState, Reward,
};
pub use context::{SdkContext, SdkContextBuilder};
pub use error::{SdkError, SdkResult};
pub use identity::{ConnectionType, DeviceIdentity, DeviceIdentityBuilder, ScreenSize};
pub use link_loader::{LinkLoader, LinkLoaderDelegate};
pub use network::{
    AsyncTransport, HttpClient, HttpMethod, HttpRequest, HttpResponse, MockHttpClient,
    RedirectLog, SchemeRegistry, TransportError, TransportResponse, TransportState,
};
#[cfg(feature = "http")]
pub use network::ReqwestClient;
pub use open::{OpenDelegate, OpenRequest, PrefetchOutcome, PrefetchQueue};
pub use purchases::{ConversionCookies, IapTrackingRequest, PurchaseResolution};
pub use session::{KeyValueStore, MemoryStore, Session, SharedSession, SqliteStore, StoreError};
pub use signer::{Params, RequestSigner};

/// Version reported to the API as `sdk_version`.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
