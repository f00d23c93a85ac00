// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Request Signer
//!
//! Builds the signed parameter set attached to every API request. The
//! signature is the hex SHA-1 digest of `token:device:nonce:secret`, with a
//! fresh random nonce per signing operation.
//!
//! # Example
//!
//! ```ignore
//! use placard_core::{DeviceIdentity, RequestSigner, Params};
//!
//! let identity = DeviceIdentity::builder("token", "secret").device_id("abc").build();
//! let params = RequestSigner::new(&identity).sign(Params::new())?;
//! assert!(params.contains_key("signature"));
//! ```

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine};
use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;
use tracing::debug;
use url::form_urlencoded;

use crate::config::ConfigurationError;
use crate::identity::DeviceIdentity;

/// Request parameters, ordered by name so query strings are stable.
pub type Params = BTreeMap<String, String>;

/// Platform tag sent as `sdk_platform`.
pub const SDK_PLATFORM: &str = "android";

/// Nonce length in bytes before encoding.
pub const NONCE_LEN: usize = 16;

/// Fields additional parameters can never replace.
const PROTECTED_PARAMS: [&str; 3] = ["token", "signature", "nonce"];

/// Errors that can occur while signing.
#[derive(Debug, Error)]
pub enum SignError {
    /// Token or secret missing.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The system random source failed.
    #[error("random number generation failed")]
    Rng,
}

/// Hex SHA-1 digest of a UTF-8 string.
///
/// Used for request signatures and reward/purchase receipts.
pub fn hex_digest(input: &str) -> String {
    hex::encode(digest(&SHA1_FOR_LEGACY_USE_ONLY, input.as_bytes()).as_ref())
}

/// Generates a base64-encoded random nonce.
pub fn generate_nonce() -> Result<String, SignError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; NONCE_LEN];
    rng.fill(&mut bytes).map_err(|_| SignError::Rng)?;
    Ok(STANDARD.encode(bytes))
}

/// Signature over `token:device:nonce:secret`.
pub fn request_signature(token: &str, device: &str, nonce: &str, secret: &str) -> String {
    hex_digest(&format!("{}:{}:{}:{}", token, device, nonce, secret))
}

/// Encodes parameters as an `application/x-www-form-urlencoded` string.
pub fn query_string(params: &Params) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Signs parameter sets for a device identity.
pub struct RequestSigner<'a> {
    identity: &'a DeviceIdentity,
}

impl<'a> RequestSigner<'a> {
    /// Creates a new signer for the given identity.
    pub fn new(identity: &'a DeviceIdentity) -> Self {
        RequestSigner { identity }
    }

    /// Signs with a freshly generated nonce.
    pub fn sign(&self, additional: Params) -> Result<Params, SignError> {
        self.identity.validate()?;
        let nonce = generate_nonce()?;
        self.sign_with_nonce(additional, &nonce)
    }

    /// Signs with a caller-chosen nonce.
    ///
    /// Additional parameters override computed fields, except `token`,
    /// `signature` and `nonce`.
    pub fn sign_with_nonce(&self, additional: Params, nonce: &str) -> Result<Params, SignError> {
        let id = self.identity;
        id.validate()?;

        let device = id.device_param();
        let signature = request_signature(id.token(), device, nonce, id.secret());

        let mut params = Params::new();
        params.insert("device".into(), device.to_string());
        params.insert("app".into(), id.app_id().to_string());
        params.insert("app_version".into(), id.app_version().to_string());
        params.insert("hardware".into(), id.hardware().to_string());
        params.insert("os".into(), id.os());
        params.insert("idiom".into(), id.screen_size().code().to_string());
        params.insert("width".into(), id.width().to_string());
        params.insert("height".into(), id.height().to_string());
        params.insert("sdk_version".into(), crate::SDK_VERSION.to_string());
        params.insert("sdk_platform".into(), SDK_PLATFORM.to_string());
        params.insert("orientation".into(), id.orientation().to_string());
        params.insert("dpi".into(), id.dpi().to_string());
        params.insert("languages".into(), id.language().to_string());
        if let Some(connection) = id.connection().param_value() {
            params.insert("connection".into(), connection.to_string());
        }

        for (key, value) in additional {
            if PROTECTED_PARAMS.contains(&key.as_str()) {
                debug!(param = %key, "ignoring override of protected parameter");
                continue;
            }
            params.insert(key, value);
        }

        params.insert("token".into(), id.token().to_string());
        params.insert("signature".into(), signature);
        params.insert("nonce".into(), nonce.to_string());

        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ConnectionType;

    fn identity() -> DeviceIdentity {
        DeviceIdentity::builder("tok", "s3cr3t")
            .device_id("device-123")
            .connection(ConnectionType::Wifi)
            .build()
    }

    #[test]
    fn test_signature_golden_value() {
        assert_eq!(
            request_signature("tok", "device-123", "nonce-1", "s3cr3t"),
            "4f1798497e5e62a87d1e79a16fdc892b16b47311"
        );
    }

    #[test]
    fn test_nonce_decodes_to_sixteen_bytes() {
        let nonce = generate_nonce().unwrap();
        assert_eq!(STANDARD.decode(nonce).unwrap().len(), NONCE_LEN);
    }

    #[test]
    fn test_protected_params_cannot_be_overridden() {
        let identity = identity();
        let mut extra = Params::new();
        extra.insert("token".into(), "evil".into());
        extra.insert("nonce".into(), "evil".into());
        extra.insert("os".into(), "custom".into());

        let params = RequestSigner::new(&identity)
            .sign_with_nonce(extra, "nonce-1")
            .unwrap();

        assert_eq!(params["token"], "tok");
        assert_eq!(params["nonce"], "nonce-1");
        assert_eq!(params["os"], "custom");
        assert_eq!(params["signature"], "4f1798497e5e62a87d1e79a16fdc892b16b47311");
    }

    #[test]
    fn test_query_string_is_sorted_and_encoded() {
        let mut params = Params::new();
        params.insert("b".into(), "x y".into());
        params.insert("a".into(), "1/2".into());
        assert_eq!(query_string(&params), "a=1%2F2&b=x+y");
    }
}
