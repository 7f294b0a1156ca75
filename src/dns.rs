//! Cached DNS resolution shared by every worker's connections.

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Minimum time a successful answer is served from the cache.
pub const DEFAULT_DNS_TTL: Duration = Duration::from_secs(60 * 60);

/// Hosts kept in the resolver's LRU cache.
pub const DNS_CACHE_SIZE: usize = 4096;

/// Cache settings layered over `base`: answers live for at least `ttl`
/// and at most [`DNS_CACHE_SIZE`] of them are kept.
pub fn cache_opts(mut base: ResolverOpts, ttl: Duration) -> ResolverOpts {
    base.cache_size = DNS_CACHE_SIZE;
    base.positive_min_ttl = Some(ttl);
    base
}

/// A resolver whose answers are cached, plugged into reqwest as its
/// connector's resolver.
#[derive(Clone)]
pub struct CachingResolver {
    resolver: Arc<TokioAsyncResolver>,
}

impl CachingResolver {
    /// Uses the system resolver configuration, falling back to the
    /// library defaults when it cannot be read.
    pub fn new(ttl: Duration) -> Self {
        let (config, opts) = match read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                log::warn!("Could not read system DNS config, using defaults: {}", e);
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self::with_config(config, cache_opts(opts, ttl))
    }

    pub fn with_config(config: ResolverConfig, opts: ResolverOpts) -> Self {
        Self {
            resolver: Arc::new(TokioAsyncResolver::tokio(config, opts)),
        }
    }

    pub async fn lookup(
        &self,
        host: &str,
    ) -> Result<Vec<SocketAddr>, Box<dyn std::error::Error + Send + Sync>> {
        let response = self.resolver.lookup_ip(host).await?;
        // Port 0 is replaced by the connector with the URL's port.
        let addrs: Vec<SocketAddr> = response.iter().map(|ip| SocketAddr::new(ip, 0)).collect();
        if addrs.is_empty() {
            return Err(format!("no addresses found for {}", host).into());
        }
        log::trace!("resolved {} to {} address(es)", host, addrs.len());
        Ok(addrs)
    }
}

impl Default for CachingResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DNS_TTL)
    }
}

impl Resolve for CachingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = self.clone();
        Box::pin(async move {
            let addrs: Addrs = Box::new(resolver.lookup(name.as_str()).await?.into_iter());
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(addrs)
        })
    }
}
