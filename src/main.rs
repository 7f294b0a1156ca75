use clap::Parser;
use indicatif::MultiProgress;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use wgetpipe::client::build_fetcher;
use wgetpipe::config::{Cli, ConfigLoader, FetchConfig};
use wgetpipe::output::{create_sink, progress::new_bar, summary};
use wgetpipe::pipeline::Pipeline;
use wgetpipe::shutdown::spawn_signal_listener;

fn init_logging(config: &FetchConfig, multi: Option<&MultiProgress>) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if config.debug {
        builder.filter_module("wgetpipe", log::LevelFilter::Debug);
    }
    let logger = builder.build();

    match multi {
        Some(multi) => indicatif_log_bridge::LogWrapper::new(multi.clone(), logger).try_init()?,
        None => {
            let level = logger.filter();
            log::set_boxed_logger(Box::new(logger))?;
            log::set_max_level(level);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ConfigLoader::from_cli(cli)?;

    let multi = config.bar.then(MultiProgress::new);
    init_logging(&config, multi.as_ref())?;

    if !config.color {
        colored::control::set_override(false);
    }
    log::debug!("Configuration: {:?}", config);

    let fetcher = build_fetcher(&config)?;
    let bar = multi.as_ref().map(|multi| multi.add(new_bar(config.guess)));
    let sink = create_sink(&config, bar.clone());

    let mut pipeline = Pipeline::new(config.clone(), fetcher);
    if let Some(bar) = &bar {
        pipeline = pipeline.with_progress(bar.clone());
    }

    let cancel = CancellationToken::new();
    let listener = spawn_signal_listener(cancel.clone());

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let report = pipeline.run(stdin, sink, cancel).await;
    listener.abort();

    if config.stats {
        print!("{}", summary::render(&report.stats, report.elapsed, config.color));
    }

    if report.cancelled {
        // A blocked stdin read would hold up runtime shutdown.
        let _ = std::io::stdout().flush();
        std::process::exit(0);
    }
    Ok(())
}
