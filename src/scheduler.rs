//! Daily runs for daemon mode

use std::{future::Future, time::Duration};

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeDelta};
use tokio::{pin, select, signal, time::sleep};
use tracing::{Instrument, error, info, info_span};

use crate::{
    config::Config,
    scraping::{RunReporter, run_scraping_job},
};

/// The first time `at` comes around strictly after `now`.
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    }
}

/// Wall clock based, so it's an hour off on the days DST changes.
pub fn until_next_run(now: DateTime<Local>, at: NaiveTime) -> Duration {
    let now = now.naive_local();
    (next_run_after(now, at) - now)
        .to_std()
        .unwrap_or_default()
}

/// Runs the job every day at the configured time until Ctrl-C.
/// A failed job is logged and the next day is tried again.
pub async fn run_daily(config: &Config, reporter: &mut dyn RunReporter) -> anyhow::Result<()> {
    run_daily_until(config, reporter, signal::ctrl_c()).await?;
    info!("Got Ctrl-C, stopping");
    Ok(())
}

/// The daily loop, stopped by `shutdown` both while waiting and while a job
/// runs.
async fn run_daily_until(
    config: &Config,
    reporter: &mut dyn RunReporter,
    shutdown: impl Future,
) -> anyhow::Result<()> {
    let at = config.scrape_time()?;
    pin!(shutdown);

    loop {
        let wait = until_next_run(Local::now(), at);
        info!("next scraping job at {at}, in {} minutes", wait.as_secs() / 60);

        select! {
            _ = sleep(wait).instrument(info_span!("Waiting for the next run")) => {}
            _ = &mut shutdown => return Ok(()),
        }

        match run_scraping_job(config, reporter, &mut shutdown).await {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(()),
            Err(e) => error!("{e:?}"),
        }
    }
}
