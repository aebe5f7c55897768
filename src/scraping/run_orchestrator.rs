//! Responsible for running the whole scraping job: every route, then the
//! html page and the JSON snapshot
use std::future::Future;

use anyhow::Context;
use chrono::{DateTime, Local};
use tokio::select;
use tracing::{error, info};

use super::{RendererPool, Renderers, RunReporter, scrape_route};
use crate::{
    config::Config,
    model::{RouteSpec, RunSnapshot},
    output::{render_html, save_html, save_snapshot},
    utils::error_chain,
};

/// Scrapes the routes one after the other, in config order. Routes that
/// fail end up in the snapshot with an empty timetable.
#[tracing::instrument(skip_all, fields(routes = routes.len()))]
pub async fn scrape_all_routes(
    routes: &[RouteSpec],
    renderers: &dyn RendererPool,
    now: DateTime<Local>,
    reporter: &mut dyn RunReporter,
) -> RunSnapshot {
    let mut snapshot = RunSnapshot::new(now);
    let date = now.format("%Y-%m-%d").to_string();

    for route in routes {
        snapshot.push(scrape_route(route, renderers, &date, reporter).await);
    }

    snapshot
}

/// Runs one complete job.
///
/// Only failing to start a renderer or to write the snapshot fails the job.
/// The browser is closed again before anything gets written. If `shutdown`
/// completes while routes are being scraped the browser is still closed,
/// nothing is written and `None` is returned.
#[tracing::instrument(skip_all, err)]
pub async fn run_scraping_job(
    config: &Config,
    reporter: &mut dyn RunReporter,
    shutdown: impl Future,
) -> anyhow::Result<Option<RunSnapshot>> {
    info!("Starting scraping job...");

    let renderers = Renderers::start(&config.renderer, config.needs_browser())
        .await
        .context("couldn't start the renderers")?;

    let snapshot = select! {
        biased;
        _ = shutdown => None,
        snapshot = scrape_all_routes(&config.routes, &renderers, Local::now(), reporter) => Some(snapshot),
    };

    if let Err(e) = renderers.close().await {
        error!("{}", error_chain(&e));
    }

    let Some(snapshot) = snapshot else {
        info!("Scraping job interrupted, nothing was saved");
        return Ok(None);
    };

    match save_html(&config.output_file, &render_html(&snapshot)) {
        Ok(()) => info!("HTML file saved to {}", config.output_file.display()),
        Err(e) => error!("Error saving HTML file: {e}"),
    }

    save_snapshot(&config.snapshot_file, &snapshot).with_context(|| {
        format!("couldn't save the snapshot to {}", config.snapshot_file.display())
    })?;

    info!("Scraping job completed successfully!");

    Ok(Some(snapshot))
}
