// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Prefetch Queue
//!
//! Fetches secondary resources into the precache strictly one at a time.
//! Task N+1 is spawned only after task N's completion has been handled on
//! the draining task, so at most one precache download or disk write is in
//! flight. A failing task still completes and the queue moves on.

use std::collections::VecDeque;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use flate2::read::GzDecoder;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::SharedDiskCache;
use crate::network::{perform, HttpClient, TransportOptions};

/// Status reported when a task fails before getting a response.
pub const BAD_REQUEST: u16 = 400;

/// Redirects followed per resource.
pub const PREFETCH_MAX_REDIRECTS: u32 = 20;

/// Result of one prefetch task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefetchOutcome {
    pub url: String,
    /// HTTP status, or [`BAD_REQUEST`] when no response was obtained.
    pub status: u16,
    /// Whether the body was committed to the cache.
    pub stored: bool,
}

impl PrefetchOutcome {
    fn failed(url: String) -> Self {
        PrefetchOutcome {
            url,
            status: BAD_REQUEST,
            stored: false,
        }
    }
}

/// FIFO of resource URLs waiting to be cached.
pub struct PrefetchQueue {
    client: Arc<dyn HttpClient>,
    cache: SharedDiskCache,
    tasks: VecDeque<String>,
    cancelled: Arc<AtomicBool>,
}

impl PrefetchQueue {
    pub fn new(client: Arc<dyn HttpClient>, cache: SharedDiskCache) -> Self {
        PrefetchQueue {
            client,
            cache,
            tasks: VecDeque::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn enqueue(&mut self, url: impl Into<String>) {
        self.tasks.push_back(url.into());
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// URLs still waiting, in order.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(String::as_str)
    }

    /// Stops the queue and closes the precache. A task already running
    /// finishes but skips its cache write.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Err(e) = self.cache.close() {
            warn!(error = %e, "could not close precache");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Runs every queued task in order, then closes the cache.
    ///
    /// `on_done` runs on the caller's task after each completion and
    /// before the next task is started.
    pub async fn drain(&mut self, mut on_done: impl FnMut(&PrefetchOutcome)) -> Vec<PrefetchOutcome> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());

        while let Some(url) = self.tasks.pop_front() {
            if self.is_cancelled() {
                debug!("prefetch queue cancelled");
                break;
            }

            let (tx, rx) = oneshot::channel();
            let client = Arc::clone(&self.client);
            let cache = self.cache.clone();
            let cancelled = Arc::clone(&self.cancelled);
            let task_url = url.clone();
            tokio::spawn(async move {
                let outcome = fetch_into_cache(client, cache, task_url, cancelled).await;
                let _ = tx.send(outcome);
            });

            let outcome = rx.await.unwrap_or_else(|_| {
                warn!(url = %url, "prefetch worker lost");
                PrefetchOutcome::failed(url)
            });
            info!(url = %outcome.url, status = outcome.status, stored = outcome.stored, "prefetch finished");
            on_done(&outcome);
            outcomes.push(outcome);
        }

        if let Err(e) = self.cache.close() {
            warn!(error = %e, "could not close precache");
        }
        outcomes
    }
}

async fn fetch_into_cache(
    client: Arc<dyn HttpClient>,
    cache: SharedDiskCache,
    url: String,
    cancelled: Arc<AtomicBool>,
) -> PrefetchOutcome {
    let parsed = match Url::parse(&url) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(url = %url, error = %e, "invalid prefetch URL");
            return PrefetchOutcome::failed(url);
        }
    };

    let options = TransportOptions {
        max_redirects: PREFETCH_MAX_REDIRECTS,
        ..TransportOptions::default()
    };
    let response = match perform(client.as_ref(), parsed, &options, &cancelled).await {
        Ok(response) => response,
        Err(e) => {
            warn!(url = %url, error = %e, "prefetch request failed");
            return PrefetchOutcome::failed(url);
        }
    };

    let status = response.status;
    if !response.is_success() {
        return PrefetchOutcome {
            url,
            status,
            stored: false,
        };
    }

    let gzipped = response
        .header("content-encoding")
        .is_some_and(|enc| enc.to_ascii_lowercase().contains("gzip"));
    let body = if gzipped {
        match gunzip(&response.body) {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %url, error = %e, "could not decode gzip body");
                return PrefetchOutcome {
                    url,
                    status,
                    stored: false,
                };
            }
        }
    } else {
        response.body
    };

    if cancelled.load(Ordering::SeqCst) {
        return PrefetchOutcome {
            url,
            status,
            stored: false,
        };
    }

    let key = url.clone();
    let write = tokio::task::spawn_blocking(move || cache.store(&key, &body)).await;
    let stored = match write {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(url = %url, error = %e, "could not cache prefetched resource");
            false
        }
        Err(e) => {
            warn!(url = %url, error = %e, "prefetch write task failed");
            false
        }
    };

    PrefetchOutcome { url, status, stored }
}

fn gunzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoded = Vec::new();
    GzDecoder::new(data).read_to_end(&mut decoded)?;
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_gunzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"precached body").unwrap();
        let compressed = encoder.finish().unwrap();
        assert_eq!(gunzip(&compressed).unwrap(), b"precached body");
    }

    #[test]
    fn test_gunzip_rejects_plain_data() {
        assert!(gunzip(b"not gzip").is_err());
    }
}
