//! The single consumer of worker results.

use crate::outcome::{Class, FetchResult};
use crate::output::OutputSink;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Aggregate counts for one run. Only the collator writes to it, and it is
/// handed back to the coordinator once the result stream ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: u64,
    pub success: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub transport_errors: u64,
    pub out_of_range: u64,
}

impl Stats {
    /// Counts one result and returns its bucket.
    pub fn record(&mut self, result: &FetchResult) -> Class {
        let class = result.class();
        self.total += 1;
        match class {
            Class::Success => self.success += 1,
            Class::ClientError => self.client_errors += 1,
            Class::ServerError => self.server_errors += 1,
            Class::Transport => self.transport_errors += 1,
            Class::OutOfRange => self.out_of_range += 1,
        }
        class
    }

    pub fn is_consistent(&self) -> bool {
        self.total
            == self.success
                + self.client_errors
                + self.server_errors
                + self.transport_errors
                + self.out_of_range
    }
}

pub struct Collator {
    results: mpsc::UnboundedReceiver<FetchResult>,
    sink: Box<dyn OutputSink>,
    errors_only: bool,
    cancel: CancellationToken,
}

impl Collator {
    pub fn new(
        results: mpsc::UnboundedReceiver<FetchResult>,
        sink: Box<dyn OutputSink>,
        errors_only: bool,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            results,
            sink,
            errors_only,
            cancel,
        }
    }

    /// Drains the result channel until every sender is gone or the run is
    /// cancelled. Results still queued at cancellation are dropped.
    pub async fn run(mut self) -> Stats {
        let mut stats = Stats::default();

        loop {
            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    log::debug!("Collator abort seen after {} results", stats.total);
                    break;
                }
                next = self.results.recv() => match next {
                    Some(result) => result,
                    None => break,
                },
            };

            let class = stats.record(&result);
            self.sink.tick();
            if self.errors_only && !class.is_error() {
                continue;
            }
            if let Err(e) = self.sink.write(&result).await {
                log::warn!("Failed to output result for {}: {}", result.url, e);
            }
        }

        if let Err(e) = self.sink.close().await {
            log::warn!("Failed to close output: {}", e);
        }
        stats
    }
}
