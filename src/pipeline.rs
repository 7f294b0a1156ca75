use crate::collator::{Collator, Stats};
use crate::config::FetchConfig;
use crate::fetcher::Fetcher;
use crate::output::OutputSink;
use crate::queue::work_queue;
use crate::source::LineSource;
use crate::worker::Worker;
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncBufRead;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    /// Every worker has finished; the collator is emptying the result channel.
    Draining,
    Done,
}

/// What a finished run hands back to the caller.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: Stats,
    pub elapsed: Duration,
    /// URLs the source put on the queue.
    pub queued: u64,
    pub cancelled: bool,
}

pub struct Pipeline {
    config: Arc<FetchConfig>,
    fetcher: Arc<dyn Fetcher>,
    progress: Option<ProgressBar>,
    state_watcher: watch::Sender<PipelineState>,
}

impl Pipeline {
    pub fn new(config: FetchConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let (state_tx, _) = watch::channel(PipelineState::Idle);

        Self {
            config: Arc::new(config),
            fetcher,
            progress: None,
            state_watcher: state_tx,
        }
    }

    /// Lets the line source grow `bar`'s total as input turns up.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn watch_state(&self) -> watch::Receiver<PipelineState> {
        self.state_watcher.subscribe()
    }

    pub fn state(&self) -> PipelineState {
        *self.state_watcher.borrow()
    }

    fn set_state(&self, state: PipelineState) {
        log::debug!("Pipeline state: {:?}", state);
        self.state_watcher.send_replace(state);
    }

    /// Fetches every URL read from `input` and returns the final counts.
    ///
    /// Cancelling `cancel` stops the source, the workers and the collator;
    /// requests in flight are aborted rather than waited for.
    pub async fn run<R>(
        &self,
        input: R,
        sink: Box<dyn OutputSink>,
        cancel: CancellationToken,
    ) -> RunReport
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let started = Instant::now();
        self.set_state(PipelineState::Running);

        let (work_tx, queue) = work_queue(self.config.queue_capacity());
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        let workers: Vec<_> = (0..self.config.max.max(1))
            .map(|id| {
                let worker = Worker::new(
                    id,
                    self.config.clone(),
                    self.fetcher.clone(),
                    queue.clone(),
                    results_tx.clone(),
                    cancel.clone(),
                );
                tokio::spawn(worker.run())
            })
            .collect();
        // Workers hold the only senders now, so the channel closes with them.
        drop(results_tx);
        drop(queue);

        let mut source = LineSource::new(input, work_tx, cancel.clone());
        if let Some(bar) = &self.progress {
            source = source.with_progress(bar.clone());
        }
        let source = tokio::spawn(source.run());

        let collator = Collator::new(results_rx, sink, self.config.errors_only, cancel.clone());
        let collator = tokio::spawn(collator.run());

        let total = workers.len();
        for (done, result) in futures::future::join_all(workers).await.into_iter().enumerate() {
            match result {
                Ok(fetched) => log::debug!("Done {}/{} ({} requests)", done + 1, total, fetched),
                Err(e) => log::error!("Worker task failed: {}", e),
            }
        }
        self.set_state(PipelineState::Draining);

        let queued = match source.await {
            Ok(count) => count,
            Err(e) => {
                log::error!("Line source task failed: {}", e);
                0
            }
        };

        let stats = match collator.await {
            Ok(stats) => stats,
            Err(e) => {
                log::error!("Collator task failed: {}", e);
                Stats::default()
            }
        };

        self.set_state(PipelineState::Done);
        RunReport {
            stats,
            elapsed: started.elapsed(),
            queued,
            cancelled: cancel.is_cancelled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::fetcher::{FetchError, FetchResponse};
    use crate::outcome::FetchResult;
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Status from the URL's last segment; `unreachable` hosts fail.
    struct StubFetcher {
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &str, _keep_body: bool) -> std::result::Result<FetchResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if url.contains("unreachable") {
                return Err(FetchError::Timeout(Duration::from_secs(1)));
            }
            let status = url.rsplit('/').next().and_then(|s| s.parse().ok()).unwrap_or(200);
            Ok(FetchResponse {
                status,
                content_length: Some(0),
                bytes_read: 0,
                body: None,
            })
        }
    }

    #[derive(Clone, Default)]
    struct Collect(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl OutputSink for Collect {
        async fn write(&mut self, result: &FetchResult) -> Result<()> {
            self.0.lock().unwrap().push(result.url.clone());
            Ok(())
        }
    }

    fn stub(delay: Duration) -> Arc<StubFetcher> {
        Arc::new(StubFetcher {
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn input(urls: &[String]) -> Cursor<Vec<u8>> {
        Cursor::new(urls.join("\n").into_bytes())
    }

    #[tokio::test]
    async fn every_url_yields_exactly_one_result() {
        let urls: Vec<String> = (0..250).map(|i| format!("http://a.test/{}/200", i)).collect();
        let config = FetchConfig {
            max: 7,
            ..Default::default()
        };
        let pipeline = Pipeline::new(config, stub(Duration::from_millis(1)));
        let sink = Collect::default();

        let report = pipeline
            .run(input(&urls), Box::new(sink.clone()), CancellationToken::new())
            .await;

        assert_eq!(report.queued, 250);
        assert_eq!(report.stats.total, 250);
        assert_eq!(report.stats.success, 250);
        assert!(report.stats.is_consistent());
        assert!(!report.cancelled);

        let mut seen = sink.0.lock().unwrap().clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 250);
        assert_eq!(pipeline.state(), PipelineState::Done);
    }

    #[tokio::test]
    async fn mixed_outcomes_are_classified() {
        let urls = vec![
            "http://a.test/ok200".to_string(),
            "http://a.test/404".to_string(),
            "http://unreachable.test/".to_string(),
        ];
        let config = FetchConfig {
            max: 2,
            ..Default::default()
        };
        let report = Pipeline::new(config, stub(Duration::ZERO))
            .run(input(&urls), Box::new(Collect::default()), CancellationToken::new())
            .await;

        assert_eq!(
            report.stats,
            Stats {
                total: 3,
                success: 1,
                client_errors: 1,
                server_errors: 0,
                transport_errors: 1,
                out_of_range: 0,
            }
        );
    }

    #[tokio::test]
    async fn single_worker_serializes_sleeps() {
        let urls: Vec<String> = (0..3).map(|i| format!("http://a.test/{}", i)).collect();
        let config = FetchConfig {
            max: 1,
            sleep: Duration::from_millis(40),
            ..Default::default()
        };
        let report = Pipeline::new(config, stub(Duration::from_millis(5)))
            .run(input(&urls), Box::new(Collect::default()), CancellationToken::new())
            .await;

        assert_eq!(report.stats.total, 3);
        assert!(report.elapsed >= Duration::from_millis(2 * 40 + 3 * 5));
    }

    #[tokio::test]
    async fn cancellation_starts_no_new_requests() {
        let urls: Vec<String> = (0..100).map(|i| format!("http://slow.test/{}", i)).collect();
        let config = FetchConfig {
            max: 4,
            ..Default::default()
        };
        let fetcher = stub(Duration::from_secs(30));
        let pipeline = Pipeline::new(config, fetcher.clone());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            pipeline.run(input(&urls), Box::new(Collect::default()), cancel),
        )
        .await
        .expect("pipeline did not shut down");

        assert!(report.cancelled);
        assert!(fetcher.calls.load(Ordering::SeqCst) <= 4);
        assert!(report.stats.total <= 4);
        assert_eq!(pipeline.state(), PipelineState::Done);
    }

    #[tokio::test]
    async fn empty_input_finishes_cleanly() {
        let report = Pipeline::new(FetchConfig::default(), stub(Duration::ZERO))
            .run(Cursor::new(Vec::new()), Box::new(Collect::default()), CancellationToken::new())
            .await;
        assert_eq!(report.stats, Stats::default());
        assert_eq!(report.queued, 0);
    }

    #[tokio::test]
    async fn state_moves_through_draining_to_done() {
        let pipeline = Pipeline::new(FetchConfig::default(), stub(Duration::ZERO));
        let mut states = pipeline.watch_state();
        assert_eq!(*states.borrow(), PipelineState::Idle);

        let watcher = tokio::spawn(async move {
            let mut seen = Vec::new();
            while states.changed().await.is_ok() {
                let state = *states.borrow();
                seen.push(state);
                if state == PipelineState::Done {
                    break;
                }
            }
            seen
        });

        pipeline
            .run(input(&["http://a.test/200".to_string()]), Box::new(Collect::default()), CancellationToken::new())
            .await;
        let seen = watcher.await.unwrap();
        assert_eq!(seen.last(), Some(&PipelineState::Done));
    }
}
