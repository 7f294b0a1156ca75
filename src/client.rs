//! Construction of the shared HTTP client and the fetcher built on it.

use crate::config::FetchConfig;
use crate::dns::CachingResolver;
use crate::error::Result;
use crate::fetcher::{ChunkedFetcher, Fetcher, HttpFetcher};
use reqwest::Client;
use std::sync::Arc;

/// Idle connections kept per host, so warm hosts keep their sockets.
pub const MAX_IDLE_PER_HOST: usize = 64;

/// Builds the one client every worker shares. No client-wide timeout is set;
/// deadlines are applied per request by the workers.
pub fn build_client(config: &FetchConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(MAX_IDLE_PER_HOST);

    if config.dns_cache {
        builder = builder.dns_resolver(Arc::new(CachingResolver::default()));
    } else {
        log::debug!("DNS caching disabled");
    }

    Ok(builder.build()?)
}

/// Picks the fetcher for this run: chunked when a chunk size is set.
pub fn build_fetcher(config: &FetchConfig) -> Result<Arc<dyn Fetcher>> {
    let client = build_client(config)?;
    Ok(match config.chunk_size {
        Some(size) => {
            log::debug!("Chunked fetching enabled ({} byte chunks)", size);
            Arc::new(ChunkedFetcher::new(client, size))
        }
        None => Arc::new(HttpFetcher::new(client)),
    })
}
