// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Verify Command
//!
//! Checks reward and purchase signatures the way the content request does.

use anyhow::{bail, Result};
use placard_core::content::{validate_purchase, validate_reward};
use placard_core::JsonObject;
use serde_json::Value;

use crate::config::CliConfig;
use crate::display;

fn check(valid: bool, what: &str) -> Result<()> {
    if valid {
        display::success(&format!("{} signature is valid", what));
        Ok(())
    } else {
        bail!("{} signature does not match", what)
    }
}

pub fn reward(
    config: &CliConfig,
    reward: &str,
    quantity: &str,
    receipt: &str,
    signature: &str,
) -> Result<()> {
    let mut data = JsonObject::new();
    data.insert("reward".into(), Value::from(reward));
    data.insert("quantity".into(), Value::from(quantity));
    data.insert("receipt".into(), Value::from(receipt));
    data.insert("signature".into(), Value::from(signature));
    check(validate_reward(&data, &config.identity()?), "Reward")
}

pub fn purchase(
    config: &CliConfig,
    product: &str,
    name: &str,
    quantity: &str,
    receipt: &str,
    signature: &str,
) -> Result<()> {
    let mut data = JsonObject::new();
    data.insert("product".into(), Value::from(product));
    data.insert("name".into(), Value::from(name));
    data.insert("quantity".into(), Value::from(quantity));
    data.insert("receipt".into(), Value::from(receipt));
    data.insert("signature".into(), Value::from(signature));
    check(validate_purchase(&data, &config.identity()?), "Purchase")
}
