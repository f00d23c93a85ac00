// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Purchase resolution tracking
//!
//! Once the host's billing flow resolves a purchase, the outcome is
//! reported with an IAP tracking request carrying the conversion cookie the
//! content supplied for that product.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::{ApiDelegate, ApiRequest, RequestSpec};
use crate::config::ConfigurationError;
use crate::content::Purchase;
use crate::context::SdkContext;
use crate::signer::Params;

/// Endpoint for purchase tracking.
pub const IAP_ENDPOINT: &str = "/v3/publisher/iap/";

/// How the billing flow ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseResolution {
    Buy,
    Cancel,
    Error,
}

impl PurchaseResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseResolution::Buy => "buy",
            PurchaseResolution::Cancel => "cancel",
            PurchaseResolution::Error => "error",
        }
    }
}

/// Conversion cookies keyed by product id.
#[derive(Debug, Clone, Default)]
pub struct ConversionCookies {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl ConversionCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the cookie for a product. `None` forgets any previous one.
    pub fn set(&self, product: &str, cookie: Option<String>) {
        let mut cookies = self.inner.lock();
        match cookie {
            Some(cookie) => {
                cookies.insert(product.to_string(), cookie);
            }
            None => {
                cookies.remove(product);
            }
        }
    }

    pub fn get(&self, product: &str) -> Option<String> {
        self.inner.lock().get(product).cloned()
    }

    /// Removes and returns the cookie for a product.
    pub fn take(&self, product: &str) -> Option<String> {
        self.inner.lock().remove(product)
    }
}

/// Reports a purchase resolution to the API.
#[derive(Debug)]
pub struct IapTrackingRequest {
    api: ApiRequest,
}

impl IapTrackingRequest {
    /// Creates a tracking request. The product's conversion cookie is
    /// consumed when the request is signed.
    pub fn new(
        ctx: &SdkContext,
        product: &str,
        quantity: i64,
        resolution: PurchaseResolution,
    ) -> Result<Self, ConfigurationError> {
        let cookies = ctx.cookies().clone();
        let product = product.to_string();

        let spec = RequestSpec::endpoint(ctx, IAP_ENDPOINT).with_param_provider(move || {
            let mut params = Params::new();
            params.insert("cookie".into(), cookies.take(&product).unwrap_or_default());
            params.insert("product".into(), product);
            params.insert("quantity".into(), quantity.to_string());
            params.insert("resolution".into(), resolution.as_str().into());
            params
        });

        Ok(IapTrackingRequest {
            api: ApiRequest::new(ctx, spec)?,
        })
    }

    /// Tracks the resolution of a purchase the content requested.
    pub fn for_purchase(
        ctx: &SdkContext,
        purchase: &Purchase,
        resolution: PurchaseResolution,
    ) -> Result<Self, ConfigurationError> {
        Self::new(ctx, &purchase.product, purchase.quantity, resolution)
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn ApiDelegate>) -> Self {
        self.api.set_delegate(Some(delegate));
        self
    }

    pub fn api(&self) -> &ApiRequest {
        &self.api
    }

    pub fn send(&mut self) {
        self.api.send();
    }

    pub async fn complete(&mut self) {
        self.api.complete().await;
    }

    pub fn cancel(&self) {
        self.api.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_consumes_cookie() {
        let cookies = ConversionCookies::new();
        cookies.set("sword", Some("c-1".into()));
        assert_eq!(cookies.get("sword").as_deref(), Some("c-1"));
        assert_eq!(cookies.take("sword").as_deref(), Some("c-1"));
        assert_eq!(cookies.take("sword"), None);
    }

    #[test]
    fn test_setting_none_forgets_cookie() {
        let cookies = ConversionCookies::new();
        cookies.set("sword", Some("c-1".into()));
        cookies.set("sword", None);
        assert_eq!(cookies.get("sword"), None);
    }

    #[test]
    fn test_resolution_wire_values() {
        assert_eq!(PurchaseResolution::Buy.as_str(), "buy");
        assert_eq!(PurchaseResolution::Cancel.as_str(), "cancel");
        assert_eq!(PurchaseResolution::Error.as_str(), "error");
    }
}
