// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! SDK Error Types
//!
//! Unified error type for setting up the SDK. Errors raised after a request
//! has been sent never surface here; they reach delegates as
//! [`RequestError`](crate::api::RequestError) or end up in the log.

use thiserror::Error;

use crate::api::{EnvelopeError, RequestError};
use crate::cache::CacheError;
use crate::config::ConfigurationError;
use crate::network::TransportError;
use crate::session::StoreError;

/// Unified error type for Placard operations.
#[derive(Error, Debug)]
pub enum SdkError {
    /// Credentials or configuration are missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Network transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Response envelope was unusable.
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// Disk cache operation failed.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Session preference storage failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RequestError> for SdkError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Configuration(e) => SdkError::Configuration(e),
            RequestError::Transport(e) => SdkError::Transport(e),
            RequestError::Envelope(e) => SdkError::Envelope(e),
            RequestError::Internal(msg) => SdkError::Internal(msg),
        }
    }
}

/// Result type for Placard operations.
pub type SdkResult<T> = Result<T, SdkError>;
