use super::OutputSink;
use super::format::{format_duration, length_format};
use crate::error::Result;
use crate::outcome::{Class, FetchResult};
use async_trait::async_trait;
use colored::Colorize;
use std::io::Write;

/// One line per result: `<status> (<size>) <url> <duration>[ (<error>)]`.
pub struct ConsoleOutput<W> {
    out: W,
    color: bool,
}

impl<W: Write + Send> ConsoleOutput<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn format_line(result: &FetchResult) -> String {
    let mut line = format!(
        "{} ({}) {} {}",
        result.status_code(),
        length_format(result.content_length()),
        result.url,
        format_duration(result.duration)
    );
    if let Some(err) = result.error() {
        line.push_str(&format!(" ({})", err));
    }
    line
}

pub fn colorize(line: &str, class: Class) -> String {
    match class {
        Class::Success => line.green().to_string(),
        Class::ClientError => line.yellow().to_string(),
        Class::ServerError | Class::Transport => line.red().to_string(),
        Class::OutOfRange => line.magenta().to_string(),
    }
}

#[async_trait]
impl<W: Write + Send> OutputSink for ConsoleOutput<W> {
    async fn write(&mut self, result: &FetchResult) -> Result<()> {
        let line = format_line(result);
        if self.color {
            writeln!(self.out, "{}", colorize(&line, result.class()))?;
        } else {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
