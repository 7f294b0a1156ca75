use clap::Parser;
use std::path::PathBuf;

/// Reads URLs from stdin, one per line, and GETs them with a bounded pool of
/// workers, printing the status, size, url and elapsed time of each.
#[derive(Debug, Parser)]
#[command(name = "wgetpipe")]
#[command(version)]
#[command(about = "Bulk concurrent HTTP GETs from a stream of URLs on stdin", long_about = None)]
pub struct Cli {
    /// Maximum in-flight GET requests at a time [default: 5]
    #[arg(long)]
    pub max: Option<usize>,

    /// Only output errors (HTTP codes >= 400 and transport failures)
    #[arg(long)]
    pub errorsonly: bool,

    /// Don't colorize the output
    #[arg(long)]
    pub nocolor: bool,

    /// Output stats at the end
    #[arg(long)]
    pub stats: bool,

    /// Time each worker sleeps between requests (e.g. 1ms, 10s)
    #[arg(long)]
    pub sleep: Option<String>,

    /// Time allowed for each GET request (e.g. 30s, 5m); 0 is unbounded
    #[arg(long)]
    pub timeout: Option<String>,

    /// Disable DNS caching
    #[arg(long)]
    pub nodnscache: bool,

    /// Use a progress bar instead of printing lines; can still use --stats
    #[arg(long)]
    pub bar: bool,

    /// Rough guess of how many GETs are coming, for --bar to start at. It adjusts
    #[arg(long)]
    pub guess: Option<u64>,

    /// Save successful response bodies under <savedir>/<host>/<path>
    #[arg(long)]
    pub save: bool,

    /// Root directory for --save [default: .]
    #[arg(long)]
    pub savedir: Option<PathBuf>,

    /// Fetch range-capable resources in chunks of this size (e.g. 512K, 4M)
    #[arg(long)]
    pub size: Option<String>,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Log full response bodies if debugging is on
    #[arg(long)]
    pub responsedebug: bool,

    /// User-Agent header sent with every request
    #[arg(long = "user-agent")]
    pub user_agent: Option<String>,

    /// Optional settings file (JSON/YAML/TOML); flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "wgetpipe",
            "--max",
            "20",
            "--errorsonly",
            "--nocolor",
            "--stats",
            "--sleep",
            "10ms",
            "--timeout",
            "5s",
            "--bar",
            "--guess",
            "1000",
            "--size",
            "4M",
        ])
        .unwrap();

        assert_eq!(cli.max, Some(20));
        assert!(cli.errorsonly && cli.nocolor && cli.stats && cli.bar);
        assert_eq!(cli.sleep.as_deref(), Some("10ms"));
        assert_eq!(cli.timeout.as_deref(), Some("5s"));
        assert_eq!(cli.guess, Some(1000));
        assert_eq!(cli.size.as_deref(), Some("4M"));
        assert!(!cli.nodnscache);
        assert!(cli.config.is_none());
    }

    #[test]
    fn rejects_non_numeric_max() {
        assert!(Cli::try_parse_from(["wgetpipe", "--max", "lots"]).is_err());
    }
}
