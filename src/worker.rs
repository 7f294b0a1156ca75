//! Fetch workers: claim a URL, GET it, report, repeat.

use crate::config::FetchConfig;
use crate::fetcher::{FetchError, FetchResponse, Fetcher};
use crate::outcome::FetchResult;
use crate::queue::WorkQueue;
use crate::save::save_body;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

pub struct Worker {
    id: usize,
    config: Arc<FetchConfig>,
    fetcher: Arc<dyn Fetcher>,
    queue: WorkQueue,
    results: mpsc::UnboundedSender<FetchResult>,
    cancel: CancellationToken,
}

impl Worker {
    pub fn new(
        id: usize,
        config: Arc<FetchConfig>,
        fetcher: Arc<dyn Fetcher>,
        queue: WorkQueue,
        results: mpsc::UnboundedSender<FetchResult>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            config,
            fetcher,
            queue,
            results,
            cancel,
        }
    }

    /// Runs until the queue is exhausted or the run is cancelled. A failed
    /// request never ends the loop. Returns the number of requests made.
    pub async fn run(self) -> u64 {
        let mut fetched = 0u64;

        loop {
            if self.cancel.is_cancelled() {
                log::debug!("Worker {} abort seen", self.id);
                break;
            }

            let url = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    log::debug!("Worker {} abort seen while idle", self.id);
                    break;
                }
                next = self.queue.claim() => match next {
                    Some(url) => url,
                    None => break,
                },
            };

            log::debug!("Worker {} getting {}", self.id, url);
            let result = self.fetch_one(url).await;
            fetched += 1;
            if self.results.send(result).is_err() {
                log::debug!("Worker {}: result channel closed", self.id);
                break;
            }

            if !self.config.sleep.is_zero() {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => break,
                    _ = sleep(self.config.sleep) => {}
                }
            }
        }

        log::debug!("Worker {} done after {} requests", self.id, fetched);
        fetched
    }

    async fn fetch_one(&self, url: String) -> FetchResult {
        // Fresh per request so one deadline or cancel never leaks into the next.
        let request = self.cancel.child_token();
        let _guard = request.clone().drop_guard();

        let keep_body = self.config.keeps_body();
        let started = Instant::now();
        let outcome = tokio::select! {
            biased;
            _ = request.cancelled() => Err(FetchError::Cancelled),
            outcome = with_deadline(self.config.timeout, self.fetcher.fetch(&url, keep_body)) => outcome,
        };
        let duration = started.elapsed();

        match outcome {
            Ok(response) => {
                self.handle_body(&url, &response).await;
                FetchResult::response(url, response.status, response.content_length, duration)
            }
            Err(e) => {
                log::debug!("Worker {} failed {}: {}", self.id, url, e);
                FetchResult::failed(url, e, duration)
            }
        }
    }

    async fn handle_body(&self, url: &str, response: &FetchResponse) {
        let Some(body) = &response.body else {
            return;
        };

        if self.config.debug && self.config.response_debug {
            log::debug!("<-----\n{}\n----->", String::from_utf8_lossy(body));
        }

        if let Some(root) = &self.config.save_dir {
            if (200..300).contains(&response.status) {
                match save_body(root, url, body).await {
                    Ok(path) => log::debug!("Saved {} to {}", url, path.display()),
                    Err(e) => log::warn!("Failed to save {}: {}", url, e),
                }
            }
        }
    }
}

/// Bounds `fut` by `timeout` when one is configured.
async fn with_deadline<F>(timeout: Option<Duration>, fut: F) -> Result<FetchResponse, FetchError>
where
    F: std::future::Future<Output = Result<FetchResponse, FetchError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .unwrap_or(Err(FetchError::Timeout(limit))),
        None => fut.await,
    }
}
