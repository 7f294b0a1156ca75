use super::OutputSink;
use crate::error::Result;
use crate::outcome::FetchResult;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};

pub const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) {msg}";

/// Bar starting at the `guess` total.
pub fn new_bar(guess: u64) -> ProgressBar {
    let bar = ProgressBar::new(guess);
    if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}

/// Raises the bar's total to `seen` when the guess was too low. Never
/// lowers it.
pub fn grow_to_fit(bar: &ProgressBar, seen: u64) {
    let total = bar.length().unwrap_or(0);
    if total < seen {
        bar.inc_length(seen - total);
    }
}

/// Advances a progress bar once per result instead of printing lines.
pub struct ProgressOutput {
    bar: ProgressBar,
}

impl ProgressOutput {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

#[async_trait]
impl OutputSink for ProgressOutput {
    fn tick(&mut self) {
        self.bar.inc(1);
    }

    async fn write(&mut self, _result: &FetchResult) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.bar.finish();
        Ok(())
    }
}
