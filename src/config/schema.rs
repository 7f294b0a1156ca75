use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

/// Settings as they appear in an optional config file. Every field may be
/// omitted; command-line flags take precedence over anything set here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max: Option<usize>,
    pub errors_only: bool,
    pub no_color: bool,
    pub stats: bool,
    /// Go-style duration string, e.g. `250ms`.
    pub sleep: Option<String>,
    /// Go-style duration string; `0` means unbounded.
    pub timeout: Option<String>,
    pub no_dns_cache: bool,
    pub bar: bool,
    pub guess: Option<u64>,
    pub save: bool,
    pub save_dir: Option<PathBuf>,
    /// Chunk size with an optional suffix, e.g. `4M`.
    pub size: Option<String>,
    pub debug: bool,
    pub response_debug: bool,
    pub user_agent: Option<String>,
}

/// The resolved, immutable configuration of one run.
#[derive(Debug, Clone, Validate)]
pub struct FetchConfig {
    /// Worker pool size.
    #[validate(range(min = 1))]
    pub max: usize,
    pub errors_only: bool,
    pub color: bool,
    pub stats: bool,
    /// Delay between finishing one request and claiming the next.
    pub sleep: Duration,
    /// Per-request deadline; `None` is unbounded.
    pub timeout: Option<Duration>,
    pub dns_cache: bool,
    pub bar: bool,
    pub guess: u64,
    /// Root directory for saved bodies; `None` disables saving.
    pub save_dir: Option<PathBuf>,
    #[validate(range(min = 1))]
    pub chunk_size: Option<u64>,
    pub debug: bool,
    pub response_debug: bool,
    pub user_agent: String,
}

impl FetchConfig {
    /// Bodies are only buffered when something downstream needs them.
    pub fn keeps_body(&self) -> bool {
        self.save_dir.is_some() || (self.debug && self.response_debug)
    }

    pub fn queue_capacity(&self) -> usize {
        self.max.saturating_mul(10).max(1)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max: default_max(),
            errors_only: false,
            color: true,
            stats: false,
            sleep: Duration::ZERO,
            timeout: None,
            dns_cache: true,
            bar: false,
            guess: 0,
            save_dir: None,
            chunk_size: None,
            debug: false,
            response_debug: false,
            user_agent: default_user_agent(),
        }
    }
}

pub fn default_max() -> usize {
    5
}

pub fn default_user_agent() -> String {
    format!("wgetpipe/{}", env!("CARGO_PKG_VERSION"))
}
