// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sign Command
//!
//! Prints the signed query string for an endpoint, for debugging server
//! side signature checks.

use anyhow::{anyhow, Result};
use placard_core::signer::query_string;
use placard_core::{Params, RequestSigner};

use crate::config::CliConfig;

/// Parses `key=value` pairs.
pub fn parse_params(pairs: &[String]) -> Result<Params> {
    let mut params = Params::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected key=value, got '{}'", pair))?;
        params.insert(key.to_string(), value.to_string());
    }
    Ok(params)
}

pub fn run(config: &CliConfig, endpoint: &str, pairs: &[String], json: bool) -> Result<()> {
    let identity = config.identity()?;
    let signed = RequestSigner::new(&identity).sign(parse_params(pairs)?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&signed)?);
    } else {
        let base = config.sdk_config().api_url(endpoint);
        println!("{}?{}", base, query_string(&signed));
    }
    Ok(())
}

// INLINE_TEST_REQUIRED: Binary crate without lib.rs - tests cannot be external
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_params_splits_on_first_equals() {
        let params = parse_params(&["placement_id=level=1".into(), "preload=0".into()]).unwrap();
        assert_eq!(params.get("placement_id").map(String::as_str), Some("level=1"));
        assert_eq!(params.get("preload").map(String::as_str), Some("0"));
    }

    #[test]
    fn test_parse_params_rejects_bare_keys() {
        assert!(parse_params(&["placement_id".into()]).is_err());
    }
}
