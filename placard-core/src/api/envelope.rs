// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Response envelope parsing
//!
//! Every API reply is a JSON object whose `response` field carries the
//! payload. An empty `response` object is a valid result.

use serde_json::{Map, Value};

use super::error::EnvelopeError;

/// A decoded JSON object.
pub type JsonObject = Map<String, Value>;

/// Field holding the payload.
pub const RESPONSE_FIELD: &str = "response";

/// Decodes a body and extracts its `response` object.
///
/// Anything but an object under `response` (missing, null, `""`,
/// `"undefined"`, arrays, numbers) is a missing response.
pub fn parse_envelope(body: &[u8]) -> Result<JsonObject, EnvelopeError> {
    let text = std::str::from_utf8(body).map_err(|e| EnvelopeError::Encoding(e.to_string()))?;
    let value: Value =
        serde_json::from_str(text).map_err(|e| EnvelopeError::Parse(e.to_string()))?;

    let Value::Object(mut envelope) = value else {
        return Err(EnvelopeError::NotAnObject);
    };

    match envelope.remove(RESPONSE_FIELD) {
        Some(Value::Object(response)) => Ok(response),
        _ => Err(EnvelopeError::MissingResponse),
    }
}
