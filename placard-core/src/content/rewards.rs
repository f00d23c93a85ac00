// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reward and purchase validation
//!
//! The renderer reports rewards and purchases as raw JSON. Each entry
//! carries a signature over its fields, the device id and the publisher
//! secret; entries whose signature does not match are dropped.

use serde_json::Value;
use tracing::debug;

use crate::api::JsonObject;
use crate::identity::DeviceIdentity;
use crate::signer::hex_digest;

/// A reward the user unlocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    pub name: String,
    /// `-1` when the payload carried no usable quantity.
    pub quantity: i64,
    pub receipt: String,
}

/// A purchase the content asked the host to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub product: String,
    pub name: String,
    pub quantity: i64,
    pub receipt: String,
    /// Renderer callback id to answer once the purchase resolves.
    pub callback: Option<String>,
    /// Conversion cookie sent back with the IAP tracking request.
    pub cookie: Option<String>,
}

/// Signature over `reward:quantity:device:receipt:secret`.
pub fn reward_signature(
    reward: &str,
    quantity: &str,
    device: &str,
    receipt: &str,
    secret: &str,
) -> String {
    hex_digest(&format!(
        "{}:{}:{}:{}:{}",
        reward, quantity, device, receipt, secret
    ))
}

/// Signature over `product:name:quantity:device:receipt:secret`.
pub fn purchase_signature(
    product: &str,
    name: &str,
    quantity: &str,
    device: &str,
    receipt: &str,
    secret: &str,
) -> String {
    hex_digest(&format!(
        "{}:{}:{}:{}:{}:{}",
        product, name, quantity, device, receipt, secret
    ))
}

/// Checks a reward entry. Hex case is ignored.
pub fn validate_reward(data: &JsonObject, identity: &DeviceIdentity) -> bool {
    let expected = reward_signature(
        &field_string(data, "reward"),
        &field_string(data, "quantity"),
        identity.device_param(),
        &field_string(data, "receipt"),
        identity.secret(),
    );
    expected.eq_ignore_ascii_case(&field_string(data, "signature"))
}

/// Checks a purchase entry. The comparison is exact.
pub fn validate_purchase(data: &JsonObject, identity: &DeviceIdentity) -> bool {
    let expected = purchase_signature(
        &field_string(data, "product"),
        &field_string(data, "name"),
        &field_string(data, "quantity"),
        identity.device_param(),
        &field_string(data, "receipt"),
        identity.secret(),
    );
    expected == field_string(data, "signature")
}

/// Extracts validated rewards from a renderer context.
pub fn parse_rewards(context: &Value, identity: &DeviceIdentity) -> Vec<Reward> {
    entries(context, "rewards")
        .filter(|data| {
            let valid = validate_reward(data, identity);
            if !valid {
                debug!(reward = %field_string(data, "reward"), "dropping reward with bad signature");
            }
            valid
        })
        .map(|data| Reward {
            name: field_string(data, "reward"),
            quantity: field_int(data, "quantity"),
            receipt: field_string(data, "receipt"),
        })
        .collect()
}

/// Extracts validated purchases from a renderer context.
pub fn parse_purchases(
    context: &Value,
    identity: &DeviceIdentity,
    callback: Option<&str>,
) -> Vec<Purchase> {
    entries(context, "purchases")
        .filter(|data| {
            let valid = validate_purchase(data, identity);
            if !valid {
                debug!(product = %field_string(data, "product"), "dropping purchase with bad signature");
            }
            valid
        })
        .map(|data| Purchase {
            product: field_string(data, "product"),
            name: field_string(data, "name"),
            quantity: field_int(data, "quantity"),
            receipt: field_string(data, "receipt"),
            callback: callback.map(str::to_string),
            cookie: data
                .get("cookie")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
        .collect()
}

fn entries<'a>(context: &'a Value, key: &str) -> impl Iterator<Item = &'a JsonObject> {
    context
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// String form of a field: strings as-is, numbers and booleans printed,
/// anything else empty.
fn field_string(data: &JsonObject, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn field_int(data: &JsonObject, key: &str) -> i64 {
    match data.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(-1),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(-1),
        _ => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity() -> DeviceIdentity {
        DeviceIdentity::builder("tok", "s3cr3t")
            .device_id("device-123")
            .build()
    }

    #[test]
    fn test_reward_golden_value() {
        assert_eq!(
            reward_signature("coins", "10", "device-123", "receipt-abc", "s3cr3t"),
            "65ba42032fed6827c6a34122bd0d823536e9aeec"
        );
    }

    #[test]
    fn test_numeric_quantity_is_signed_as_text() {
        let data = json!({
            "reward": "gems",
            "quantity": 5,
            "receipt": "rcpt-1",
            "signature": "734da802b69ca3df87b76e2ba5193708b512934a"
        });
        let rewards = parse_rewards(&json!({ "rewards": [data] }), &identity());
        assert_eq!(
            rewards,
            vec![Reward {
                name: "gems".into(),
                quantity: 5,
                receipt: "rcpt-1".into()
            }]
        );
    }

    #[test]
    fn test_reward_signature_ignores_case() {
        let data = json!({
            "reward": "coins",
            "quantity": "10",
            "receipt": "receipt-abc",
            "signature": "65BA42032FED6827C6A34122BD0D823536E9AEEC"
        });
        assert!(validate_reward(data.as_object().unwrap(), &identity()));
    }

    #[test]
    fn test_purchase_signature_is_case_sensitive() {
        let data = json!({
            "product": "com.example.sword",
            "name": "Sword",
            "quantity": "1",
            "receipt": "rcpt-9",
            "signature": "CFDAA0A585286508B3013D6EA2B0355478168C1F"
        });
        assert!(!validate_purchase(data.as_object().unwrap(), &identity()));
    }

    #[test]
    fn test_missing_array_yields_nothing() {
        assert!(parse_rewards(&json!({}), &identity()).is_empty());
        assert!(parse_purchases(&Value::Null, &identity(), None).is_empty());
    }
}
