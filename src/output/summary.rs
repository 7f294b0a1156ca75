use super::format::format_duration;
use crate::collator::Stats;
use colored::Colorize;
use std::time::Duration;

/// The end-of-run block printed with `--stats`.
pub fn render(stats: &Stats, elapsed: Duration, color: bool) -> String {
    let paint = |n: u64, red: bool| -> String {
        match (color, red) {
            (false, _) => n.to_string(),
            (true, true) => n.to_string().red().to_string(),
            (true, false) => n.to_string().yellow().to_string(),
        }
    };

    format!(
        "\n\nGETs: {}\nErrors: {}\n500 Errors: {}\n400 Errors: {}\nMismatches: {}\nElapsed Time: {}\n",
        stats.total,
        paint(stats.transport_errors, true),
        paint(stats.server_errors, true),
        paint(stats.client_errors, false),
        paint(stats.out_of_range, false),
        format_duration(elapsed)
    )
}
