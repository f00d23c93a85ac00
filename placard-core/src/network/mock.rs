// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock HTTP Client
//!
//! In-memory client for testing without network access. Responses are
//! scripted per URL; a URL with a query string falls back to the route
//! registered for the same URL without its query, so signed API requests
//! can be matched by endpoint.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::client::{HttpClient, HttpRequest, HttpResponse};
use super::error::TransportError;

#[derive(Debug, Clone)]
struct MockRoute {
    response: Result<HttpResponse, TransportError>,
    delay: Option<Duration>,
}

/// Mock HTTP client for testing.
///
/// Unrouted URLs answer `404` with an empty body.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    routes: Mutex<HashMap<String, MockRoute>>,
    requests: Mutex<Vec<HttpRequest>>,
    completed: Mutex<Vec<String>>,
}

impl MockHttpClient {
    /// Creates a new mock client with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a response with the given status and body.
    pub fn respond(&self, url: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.respond_with(url, HttpResponse::new(status, body));
    }

    /// Scripts a full response.
    pub fn respond_with(&self, url: &str, response: HttpResponse) {
        self.routes.lock().insert(
            url.to_string(),
            MockRoute {
                response: Ok(response),
                delay: None,
            },
        );
    }

    /// Scripts a redirect to `location`.
    pub fn redirect(&self, url: &str, status: u16, location: &str) {
        self.respond_with(
            url,
            HttpResponse::new(status, Vec::new()).with_header("Location", location),
        );
    }

    /// Scripts a transport failure.
    pub fn fail(&self, url: &str, error: TransportError) {
        self.routes.lock().insert(
            url.to_string(),
            MockRoute {
                response: Err(error),
                delay: None,
            },
        );
    }

    /// Delays the scripted answer for `url`.
    pub fn set_delay(&self, url: &str, delay: Duration) {
        if let Some(route) = self.routes.lock().get_mut(url) {
            route.delay = Some(delay);
        }
    }

    /// All requests received, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// URLs of all requests received, in arrival order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .map(|r| r.url.to_string())
            .collect()
    }

    /// URLs whose answers have been returned, in completion order.
    pub fn completed_urls(&self) -> Vec<String> {
        self.completed.lock().clone()
    }

    fn route_for(&self, request: &HttpRequest) -> Option<MockRoute> {
        let routes = self.routes.lock();
        if let Some(route) = routes.get(request.url.as_str()) {
            return Some(route.clone());
        }
        let mut bare = request.url.clone();
        bare.set_query(None);
        routes.get(bare.as_str()).cloned()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request.clone());
        let route = self.route_for(&request);

        if let Some(delay) = route.as_ref().and_then(|r| r.delay) {
            tokio::time::sleep(delay).await;
        }
        self.completed.lock().push(request.url.to_string());

        match route {
            Some(route) => route.response,
            None => Ok(HttpResponse::new(404, Vec::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[tokio::test]
    async fn test_query_falls_back_to_bare_route() {
        let client = MockHttpClient::new();
        client.respond("https://api.test/v3/open/", 200, b"ok".to_vec());

        let url = Url::parse("https://api.test/v3/open/?nonce=abc").unwrap();
        let response = client.execute(HttpRequest::get(url)).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"ok");
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unrouted_url_is_not_found() {
        let client = MockHttpClient::new();
        let url = Url::parse("https://api.test/missing").unwrap();
        let response = client.execute(HttpRequest::get(url)).await.unwrap();
        assert_eq!(response.status, 404);
    }
}
