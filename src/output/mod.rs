use crate::config::FetchConfig;
use crate::error::Result;
use crate::outcome::FetchResult;
use async_trait::async_trait;
use indicatif::ProgressBar;

pub mod console;
pub mod format;
pub mod progress;
pub mod summary;

pub use console::ConsoleOutput;
pub use progress::ProgressOutput;

/// Where the collator sends results.
#[async_trait]
pub trait OutputSink: Send {
    /// Called for every result, including ones suppressed by errors-only
    /// mode.
    fn tick(&mut self) {}

    /// Renders one result.
    async fn write(&mut self, result: &FetchResult) -> Result<()>;

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A bar sink when `bar` is set, coloured lines on stdout otherwise.
pub fn create_sink(config: &FetchConfig, bar: Option<ProgressBar>) -> Box<dyn OutputSink> {
    match bar {
        Some(bar) if config.bar => Box::new(ProgressOutput::new(bar)),
        _ => Box::new(ConsoleOutput::new(std::io::stdout(), config.color)),
    }
}
