// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! reqwest-backed HTTP client
//!
//! Automatic redirects are disabled; [`AsyncTransport`](super::AsyncTransport)
//! follows them itself.

use async_trait::async_trait;
use reqwest::{redirect, Client, Method};

use super::client::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use super::error::TransportError;
use crate::config::SdkConfig;

/// Production [`HttpClient`].
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Create a new client from config
    pub fn new(config: &SdkConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::none());

        // Support proxy if configured
        if let Some(proxy_url) = &config.proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(io_error)?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build().map_err(io_error)?,
        })
    }
}

fn io_error(err: reqwest::Error) -> TransportError {
    TransportError::Io(err.to_string())
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        };

        let mut builder = self.client.request(method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.method == HttpMethod::Post && !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder.send().await.map_err(io_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(io_error)?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
