// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Error Types

use thiserror::Error;

use crate::config::ConfigurationError;
use crate::network::TransportError;
use crate::signer::SignError;

/// Errors in the response envelope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Body is not valid UTF-8.
    #[error("Response is not valid UTF-8: {0}")]
    Encoding(String),

    /// Body is not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(String),

    /// Top-level JSON value is not an object.
    #[error("Response is not a JSON object")]
    NotAnObject,

    /// `response` field missing, null or a placeholder.
    #[error("No response body in reply")]
    MissingResponse,
}

/// Error reported to request delegates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// Missing credentials or bad base URL.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Network failure or non-2xx status.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Unusable response body.
    #[error("Envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SignError> for RequestError {
    fn from(err: SignError) -> Self {
        match err {
            SignError::Configuration(e) => RequestError::Configuration(e),
            SignError::Rng => RequestError::Internal(err.to_string()),
        }
    }
}
