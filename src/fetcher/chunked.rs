use super::{FetchError, FetchResponse, Fetcher, drain};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::header::{CONTENT_RANGE, HeaderValue, RANGE};
use reqwest::{Client, StatusCode};

/// Range requests allowed in flight for a single logical GET.
pub const CHUNK_PARALLELISM: usize = 4;

/// Splits GETs into `Range` requests of `chunk_size` bytes and reassembles
/// them into one logical response.
///
/// The first chunk doubles as the probe: if the server answers it with
/// anything other than `206 Partial Content` that answer is the response.
/// A `416` (an empty resource) is fetched again without `Range`.
#[derive(Clone)]
pub struct ChunkedFetcher {
    client: Client,
    chunk_size: u64,
}

impl ChunkedFetcher {
    pub fn new(client: Client, chunk_size: u64) -> Self {
        Self {
            client,
            chunk_size: chunk_size.max(1),
        }
    }

    async fn fetch_range(
        &self,
        url: &str,
        (start, end): (u64, u64),
        keep_body: bool,
    ) -> Result<(u64, Option<Vec<u8>>), FetchError> {
        let response = self
            .client
            .get(url)
            .header(RANGE, format!("bytes={}-{}", start, end))
            .send()
            .await?;
        if response.status() != StatusCode::PARTIAL_CONTENT {
            return Err(FetchError::Range(format!(
                "expected 206 for bytes={}-{}, got {}",
                start,
                end,
                response.status().as_u16()
            )));
        }

        let (read, body) = drain(response, keep_body).await?;
        let expected = end - start + 1;
        if read != expected {
            return Err(FetchError::Range(format!(
                "short range bytes={}-{}: {} of {} bytes",
                start, end, read, expected
            )));
        }
        Ok((read, body))
    }
}

#[async_trait]
impl Fetcher for ChunkedFetcher {
    async fn fetch(&self, url: &str, keep_body: bool) -> Result<FetchResponse, FetchError> {
        let probe = self
            .client
            .get(url)
            .header(RANGE, format!("bytes=0-{}", self.chunk_size - 1))
            .send()
            .await?;

        if probe.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            log::debug!("{}: range not satisfiable, refetching without Range", url);
            drain(probe, false).await?;
            let response = self.client.get(url).send().await?;
            return whole(response, keep_body).await;
        }
        if probe.status() != StatusCode::PARTIAL_CONTENT {
            return whole(probe, keep_body).await;
        }

        let total = parse_total_len(probe.headers().get(CONTENT_RANGE)).ok_or_else(|| {
            FetchError::Range("206 response without a usable Content-Range total".to_string())
        })?;
        let (first_read, first_body) = drain(probe, keep_body).await?;

        let ranges = byte_ranges(total, self.chunk_size);
        log::debug!("{}: {} bytes in {} chunks", url, total, ranges.len());

        let (bytes_read, body) = stream::iter(ranges.into_iter().skip(1))
            .map(|range| self.fetch_range(url, range, keep_body))
            .buffered(CHUNK_PARALLELISM)
            .try_fold((first_read, first_body), |(read, body), (n, chunk)| async move {
                let body = match (body, chunk) {
                    (Some(mut acc), Some(chunk)) => {
                        acc.extend_from_slice(&chunk);
                        Some(acc)
                    }
                    _ => None,
                };
                Ok((read + n, body))
            })
            .await?;

        if bytes_read != total {
            return Err(FetchError::Range(format!(
                "reassembled {} of {} bytes",
                bytes_read, total
            )));
        }

        Ok(FetchResponse {
            status: StatusCode::OK.as_u16(),
            content_length: Some(total),
            bytes_read,
            body,
        })
    }
}

/// An unsplit response, passed through as-is.
async fn whole(response: reqwest::Response, keep_body: bool) -> Result<FetchResponse, FetchError> {
    let status = response.status().as_u16();
    let content_length = response.content_length();
    let (bytes_read, body) = drain(response, keep_body).await?;
    Ok(FetchResponse {
        status,
        content_length,
        bytes_read,
        body,
    })
}

/// Inclusive `(start, end)` byte ranges covering `total` bytes.
pub fn byte_ranges(total: u64, chunk_size: u64) -> Vec<(u64, u64)> {
    let chunk_size = chunk_size.max(1);
    let mut ranges = Vec::new();
    let mut start = 0;
    while start < total {
        let end = (start + chunk_size).min(total) - 1;
        ranges.push((start, end));
        start = end + 1;
    }
    ranges
}

/// Total length from e.g. `bytes 0-1023/40960`; `None` for `*`.
fn parse_total_len(v: Option<&HeaderValue>) -> Option<u64> {
    let s = v?.to_str().ok()?;
    let slash = s.rfind('/')?;
    let total = s[(slash + 1)..].trim();
    if total == "*" {
        None
    } else {
        total.parse::<u64>().ok()
    }
}
