//! The single-GET seam between a worker and the network.
//!
//! A [`Fetcher`] performs one logical GET and returns once the body has been
//! fully consumed, so the connection can go back to the pool. Everything the
//! worker needs from a response is captured in [`FetchResponse`].

use async_trait::async_trait;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

pub mod chunked;
pub mod http;

pub use chunked::ChunkedFetcher;
pub use http::HttpFetcher;

/// What is left of a response once its body has been drained.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    /// Length as reported by the server, if it reported one.
    pub content_length: Option<u64>,
    /// Bytes actually read off the wire.
    pub bytes_read: u64,
    /// Only populated when the caller asked for the body.
    pub body: Option<Vec<u8>>,
}

/// A failure before or instead of a usable HTTP response.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{}", error_chain(.0))]
    Transport(#[from] reqwest::Error),

    #[error("context deadline exceeded after {0:?}")]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,

    #[error("range fetch failed: {0}")]
    Range(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Timeout(_) => true,
            FetchError::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Renders an error followed by each of its sources, `a: b: c`.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issues one GET for `url`. The body is always read to the end; it is
    /// returned in [`FetchResponse::body`] only when `keep_body` is set.
    async fn fetch(&self, url: &str, keep_body: bool) -> Result<FetchResponse, FetchError>;
}

/// Reads a response body to completion, optionally keeping it.
pub(crate) async fn drain(
    mut response: reqwest::Response,
    keep_body: bool,
) -> Result<(u64, Option<Vec<u8>>), FetchError> {
    let mut body = keep_body.then(Vec::new);
    let mut read = 0u64;
    while let Some(chunk) = response.chunk().await? {
        read += chunk.len() as u64;
        if let Some(buf) = body.as_mut() {
            buf.extend_from_slice(&chunk);
        }
    }
    Ok((read, body))
}
