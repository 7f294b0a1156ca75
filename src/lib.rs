pub mod client;
pub mod collator;
pub mod config;
pub mod dns;
pub mod error;
pub mod fetcher;
pub mod outcome;
pub mod output;
pub mod pipeline;
pub mod queue;
pub mod save;
pub mod shutdown;
pub mod source;
pub mod worker;

pub use collator::{Collator, Stats};
pub use config::{Cli, ConfigLoader, FetchConfig};
pub use error::{Error, Result};
pub use fetcher::{FetchError, FetchResponse, Fetcher};
pub use outcome::{Class, FetchResult, Outcome};
pub use pipeline::{Pipeline, PipelineState, RunReport};
