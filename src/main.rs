use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use dotenvy::dotenv;
use scraping::{TracingReporter, run_scraping_job};
use tokio::signal;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

mod config;
mod extraction;
mod model;
mod output;
mod scheduler;
mod scraping;
mod utils;

/// Scrapes today's train timetables into a static html page and a JSON snapshot
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Config file, created with defaults if it doesn't exist
    #[arg(short, long, env = "RAIL_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Keep running and scrape every day at the configured `scrape_time`
    #[arg(long)]
    daemon: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    _ = dotenv();
    let args = Args::parse();

    let _guard = init_tracing();

    let config = Config::load_or_bootstrap(&args.config).context("couldn't load the config")?;
    let mut reporter = TracingReporter;

    if args.daemon {
        scheduler::run_daily(&config, &mut reporter).await?;
    } else {
        run_scraping_job(&config, &mut reporter, signal::ctrl_c()).await?;
    }

    Ok(())
}

/// Logs to stdout and to daily rolling files in `./logs`.
/// The returned guard flushes the file log when dropped.
fn init_tracing() -> WorkerGuard {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let appender = tracing_appender::rolling::daily("./logs", "rail_timetable.log");
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);

    // A layer that logs events to rolling files.
    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_appender)
        .with_ansi(false);

    let stdout_log = tracing_subscriber::fmt::layer();

    Registry::default()
        .with(stdout_log)
        .with(file_log)
        .with(env_filter)
        .init();

    guard
}
