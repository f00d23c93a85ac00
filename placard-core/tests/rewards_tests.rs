// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for content::rewards and purchases (validation and IAP tracking)

mod common;

use std::sync::Arc;

use common::strategies::{field_strategy, mutate_one_char};
use common::{context, envelope, identity, query_value, IAP_URL};
use placard_core::content::{
    parse_purchases, purchase_signature, reward_signature, validate_purchase, validate_reward,
};
use placard_core::{IapTrackingRequest, MockHttpClient, Purchase, PurchaseResolution};
use proptest::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

const REWARD_GOLDEN: &str = "65ba42032fed6827c6a34122bd0d823536e9aeec";
const PURCHASE_GOLDEN: &str = "cfdaa0a585286508b3013d6ea2b0355478168c1f";

fn reward_entry(reward: &str, quantity: &str, receipt: &str, signature: &str) -> Value {
    json!({
        "reward": reward,
        "quantity": quantity,
        "receipt": receipt,
        "signature": signature,
    })
}

#[test]
fn test_reward_golden_signature() {
    assert_eq!(
        reward_signature("coins", "10", common::DEVICE, "receipt-abc", common::SECRET),
        REWARD_GOLDEN
    );
    let entry = reward_entry("coins", "10", "receipt-abc", REWARD_GOLDEN);
    assert!(validate_reward(entry.as_object().unwrap(), &identity()));
}

#[test]
fn test_purchase_golden_signature() {
    assert_eq!(
        purchase_signature(
            "com.example.sword",
            "Sword",
            "1",
            common::DEVICE,
            "rcpt-9",
            common::SECRET
        ),
        PURCHASE_GOLDEN
    );
    let entry = json!({
        "product": "com.example.sword",
        "name": "Sword",
        "quantity": "1",
        "receipt": "rcpt-9",
        "signature": PURCHASE_GOLDEN,
    });
    assert!(validate_purchase(entry.as_object().unwrap(), &identity()));
}

#[test]
fn test_unsigned_entries_are_dropped() {
    let context = json!({
        "purchases": [
            { "product": "com.example.sword", "name": "Sword", "quantity": "1", "receipt": "rcpt-9" },
            "not an object",
            {
                "product": "com.example.sword",
                "name": "Sword",
                "quantity": "1",
                "receipt": "rcpt-9",
                "signature": PURCHASE_GOLDEN
            }
        ]
    });

    let purchases = parse_purchases(&context, &identity(), None);
    assert_eq!(
        purchases,
        vec![Purchase {
            product: "com.example.sword".into(),
            name: "Sword".into(),
            quantity: 1,
            receipt: "rcpt-9".into(),
            callback: None,
            cookie: None,
        }]
    );
}

proptest! {
    #[test]
    fn prop_reward_mutation_fails_validation(
        reward in field_strategy(),
        quantity in field_strategy(),
        receipt in field_strategy(),
        field in 0usize..3,
        pos in 0usize..64,
    ) {
        let signature = reward_signature(&reward, &quantity, common::DEVICE, &receipt, common::SECRET);
        let valid = reward_entry(&reward, &quantity, &receipt, &signature);
        prop_assert!(validate_reward(valid.as_object().unwrap(), &identity()));

        let mut fields = [reward, quantity, receipt];
        fields[field] = mutate_one_char(&fields[field], pos);
        let tampered = reward_entry(&fields[0], &fields[1], &fields[2], &signature);
        prop_assert!(!validate_reward(tampered.as_object().unwrap(), &identity()));
    }

    #[test]
    fn prop_purchase_mutation_fails_validation(
        product in field_strategy(),
        name in field_strategy(),
        receipt in field_strategy(),
        field in 0usize..3,
        pos in 0usize..64,
    ) {
        let signature = purchase_signature(&product, &name, "1", common::DEVICE, &receipt, common::SECRET);
        let mut fields = [product, name, receipt];
        fields[field] = mutate_one_char(&fields[field], pos);
        let tampered = json!({
            "product": fields[0],
            "name": fields[1],
            "quantity": "1",
            "receipt": fields[2],
            "signature": signature,
        });
        prop_assert!(!validate_purchase(tampered.as_object().unwrap(), &identity()));
    }

    #[test]
    fn prop_signature_mutation_fails_validation(pos in 0usize..40) {
        let forged = mutate_one_char(REWARD_GOLDEN, pos);
        let entry = reward_entry("coins", "10", "receipt-abc", &forged);
        prop_assert!(!validate_reward(entry.as_object().unwrap(), &identity()));
    }
}

#[tokio::test]
async fn test_iap_tracking_consumes_cookie() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockHttpClient::new());
    mock.respond(IAP_URL, 200, envelope(json!({})));
    let ctx = context(&mock, dir.path());
    ctx.cookies().set("com.example.sword", Some("conv-77".into()));

    let mut request =
        IapTrackingRequest::new(&ctx, "com.example.sword", 2, PurchaseResolution::Buy).unwrap();
    request.send();
    request.complete().await;

    let requests = mock.requests();
    let url = &requests[0].url;
    assert_eq!(query_value(url, "product").as_deref(), Some("com.example.sword"));
    assert_eq!(query_value(url, "quantity").as_deref(), Some("2"));
    assert_eq!(query_value(url, "resolution").as_deref(), Some("buy"));
    assert_eq!(query_value(url, "cookie").as_deref(), Some("conv-77"));
    assert_eq!(ctx.cookies().get("com.example.sword"), None);
}

#[tokio::test]
async fn test_iap_tracking_without_cookie_sends_empty_value() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockHttpClient::new());
    mock.respond(IAP_URL, 200, envelope(json!({})));
    let ctx = context(&mock, dir.path());

    let purchase = Purchase {
        product: "com.example.shield".into(),
        name: "Shield".into(),
        quantity: 1,
        receipt: "rcpt-1".into(),
        callback: None,
        cookie: None,
    };
    let mut request =
        IapTrackingRequest::for_purchase(&ctx, &purchase, PurchaseResolution::Cancel).unwrap();
    request.send();
    request.complete().await;

    let requests = mock.requests();
    let url = &requests[0].url;
    assert_eq!(query_value(url, "cookie").as_deref(), Some(""));
    assert_eq!(query_value(url, "resolution").as_deref(), Some("cancel"));
}
