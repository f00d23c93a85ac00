// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration for the SDK

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Production API host.
pub const DEFAULT_API_BASE_URL: &str = "https://api.placard.app";

/// Redirect cap used when opening device URLs.
pub const DEFAULT_LINK_REDIRECTS: u32 = 10;

/// Configuration for the request subsystem
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// API host every endpoint slug is appended to
    pub api_base_url: String,

    /// Directory the precache subdirectory is created in
    pub cache_dir: PathBuf,

    /// Enable/disable precaching of secondary resources
    pub precache_enabled: bool,

    /// Maximum precache size on disk (bytes)
    pub precache_size: u64,

    /// HTTP timeout for requests
    pub timeout: Duration,

    /// Maximum redirects followed when opening device URLs
    pub link_max_redirects: u32,

    /// Proxy URL (e.g. a SOCKS5 proxy)
    pub proxy_url: Option<String>,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cache_dir: PathBuf::from("."),
            precache_enabled: true,
            precache_size: 8 * 1024 * 1024, // 8 MB
            timeout: Duration::from_secs(30),
            link_max_redirects: DEFAULT_LINK_REDIRECTS,
            proxy_url: None,
            user_agent: format!("Placard/{}", crate::SDK_VERSION),
        }
    }
}

impl SdkConfig {
    /// Point the SDK at a different API host
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Store precached resources under the given directory
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Configure with custom proxy
    pub fn with_proxy(mut self, proxy_url: String) -> Self {
        self.proxy_url = Some(proxy_url);
        self
    }

    /// Disable precaching (the prefetch queue is never populated)
    pub fn without_precache(mut self) -> Self {
        self.precache_enabled = false;
        self
    }

    /// Appends an endpoint slug to the API base URL.
    pub fn api_url(&self, slug: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), slug)
    }

    /// Checks that the API base URL is usable.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigurationError::MissingBaseUrl);
        }
        Url::parse(&self.api_base_url)
            .map_err(|e| ConfigurationError::InvalidBaseUrl(e.to_string()))?;
        Ok(())
    }
}

/// Missing or invalid setup. Fatal at construction time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The publisher token is empty
    #[error("publisher token must be set before sending requests")]
    MissingToken,

    /// The publisher secret is empty
    #[error("publisher secret must be set before sending requests")]
    MissingSecret,

    /// No API base URL configured
    #[error("API base URL is empty")]
    MissingBaseUrl,

    /// The API base URL does not parse
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// No HTTP client was supplied and the `http` feature is disabled
    #[error("no HTTP client configured")]
    MissingHttpClient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_joins_slug() {
        let config = SdkConfig::default().with_api_base_url("https://api.example.com/");
        assert_eq!(
            config.api_url("/v3/publisher/open/"),
            "https://api.example.com/v3/publisher/open/"
        );
    }

    #[test]
    fn test_validate_rejects_empty_base_url() {
        let config = SdkConfig::default().with_api_base_url("  ");
        assert_eq!(config.validate(), Err(ConfigurationError::MissingBaseUrl));
    }
}
