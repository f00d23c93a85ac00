// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI Configuration

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use placard_core::{DeviceIdentity, SdkConfig, SdkContext, SqliteStore};
use uuid::Uuid;

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Data directory for the session database, device id and precache.
    pub data_dir: PathBuf,
    /// Publisher API host.
    pub api_url: String,
    /// Publisher token.
    pub token: Option<String>,
    /// Publisher secret.
    pub secret: Option<String>,
}

impl CliConfig {
    /// Session totals database.
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.db")
    }

    /// File holding this installation's device id.
    pub fn device_id_path(&self) -> PathBuf {
        self.data_dir.join("device_id")
    }

    /// Loads the device id, generating one on first use.
    pub fn device_id(&self) -> Result<String> {
        let path = self.device_id_path();
        if let Ok(existing) = fs::read_to_string(&path) {
            let existing = existing.trim();
            if !existing.is_empty() {
                return Ok(existing.to_string());
            }
        }

        fs::create_dir_all(&self.data_dir)?;
        let id = Uuid::new_v4().simple().to_string();
        fs::write(&path, &id).with_context(|| format!("writing {}", path.display()))?;
        Ok(id)
    }

    /// Builds the device identity from the configured credentials.
    pub fn identity(&self) -> Result<DeviceIdentity> {
        let (Some(token), Some(secret)) = (&self.token, &self.secret) else {
            bail!("Publisher credentials missing. Set PLACARD_TOKEN and PLACARD_SECRET or pass --token/--secret.");
        };
        Ok(DeviceIdentity::builder(token.as_str(), secret.as_str())
            .device_id(self.device_id()?)
            .app("placard-cli", env!("CARGO_PKG_VERSION"))
            .build())
    }

    /// SDK configuration rooted in the data directory.
    pub fn sdk_config(&self) -> SdkConfig {
        SdkConfig::default()
            .with_api_base_url(&self.api_url)
            .with_cache_dir(&self.data_dir)
    }

    /// Builds an SDK context with persistent session totals.
    pub fn context(&self) -> Result<SdkContext> {
        fs::create_dir_all(&self.data_dir)?;
        let store = SqliteStore::open(self.session_path())?;
        let ctx = SdkContext::builder(self.identity()?)
            .config(self.sdk_config())
            .session_store(Box::new(store))
            .build()?;
        Ok(ctx)
    }
}
