//! Feeds trimmed input lines into the work queue.

use crate::output::progress::grow_to_fit;
use crate::queue::WorkSender;
use indicatif::ProgressBar;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::SplitStream;
use tokio_util::sync::CancellationToken;

pub struct LineSource<R> {
    reader: R,
    queue: WorkSender,
    cancel: CancellationToken,
    progress: Option<ProgressBar>,
}

impl<R> LineSource<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(reader: R, queue: WorkSender, cancel: CancellationToken) -> Self {
        Self {
            reader,
            queue,
            cancel,
            progress: None,
        }
    }

    /// Grow `bar`'s total as lines beyond its current length turn up.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Pushes every non-blank line until EOF or cancellation, then drops the
    /// sender so workers see the queue close. Returns the number of URLs
    /// queued.
    pub async fn run(self) -> u64 {
        let LineSource {
            reader,
            queue,
            cancel,
            progress,
        } = self;
        let mut lines = SplitStream::new(reader.split(b'\n'));
        let mut count = 0u64;

        loop {
            if cancel.is_cancelled() {
                log::debug!("Source abort seen!");
                break;
            }

            let line = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::debug!("Source abort seen while reading!");
                    break;
                }
                line = lines.next() => line,
            };

            let line = match line {
                Some(Ok(bytes)) => match String::from_utf8(bytes) {
                    Ok(line) => line,
                    Err(e) => {
                        log::warn!("Skipping input line that is not UTF-8: {}", e);
                        continue;
                    }
                },
                Some(Err(e)) => {
                    log::error!("Error reading input: {}", e);
                    break;
                }
                None => {
                    log::debug!("EOF seen after {} lines", count);
                    break;
                }
            };

            let url = line.trim();
            if url.is_empty() {
                continue;
            }

            let sent = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::debug!("Source abort seen while queueing!");
                    break;
                }
                sent = queue.send(url.to_string()) => sent,
            };
            if sent.is_err() {
                log::debug!("Work queue closed, stopping source");
                break;
            }

            count += 1;
            if let Some(bar) = &progress {
                grow_to_fit(bar, count);
            }
        }

        count
    }
}
