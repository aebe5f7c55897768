//! Scrapes the timetable of a single route.
//!
//! A route goes through `Start -> UrlBuilt -> PageAcquired -> ContainersSelected
//! -> PairsExtracted -> Deduplicated -> Done`. Any failure ends the route with an
//! empty timetable, it never reaches the caller.
use itertools::Itertools;
use scraper::Html;
use tracing::debug;

use super::{AcquireError, RendererPool, RunReporter};
use crate::{
    extraction::{Pairing, dedup_pairs, pair_trip},
    model::{RouteResult, RouteSpec, TimePair},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScrapeStage {
    Start,
    UrlBuilt,
    PageAcquired,
    ContainersSelected,
    PairsExtracted,
    Deduplicated,
    Done,
}

/// Scrapes `route` for `date` (`YYYY-MM-DD`). Failures are handed to the
/// reporter and turn into an empty timetable.
#[tracing::instrument(skip_all, fields(route = %route.name))]
pub async fn scrape_route(
    route: &RouteSpec,
    renderers: &dyn RendererPool,
    date: &str,
    reporter: &mut dyn RunReporter,
) -> RouteResult {
    match try_scrape_route(route, renderers, date, reporter).await {
        Ok(timetable) => {
            reporter.route_finished(route, timetable.len());
            RouteResult::new(route, timetable)
        }
        Err(e) => {
            reporter.route_failed(route, &e);
            RouteResult::empty(route)
        }
    }
}

async fn try_scrape_route(
    route: &RouteSpec,
    renderers: &dyn RendererPool,
    date: &str,
    reporter: &mut dyn RunReporter,
) -> Result<Vec<TimePair>, RouteScrapeError> {
    debug!(stage = ?ScrapeStage::Start);
    let url = route.url_for_date(date);
    debug!(stage = ?ScrapeStage::UrlBuilt, %url);
    reporter.route_started(route, &url);

    let renderer = renderers
        .renderer_for(route.renderer)
        .ok_or(RouteScrapeError {
            stage: ScrapeStage::UrlBuilt,
            source: AcquireError::Unavailable(route.renderer),
        })?;

    let markup = renderer
        .render(&url, &route.selectors.trip_container)
        .await
        .map_err(|source| RouteScrapeError {
            stage: ScrapeStage::UrlBuilt,
            source,
        })?;
    debug!(stage = ?ScrapeStage::PageAcquired, bytes = markup.len());

    let timetable = extract_timetable(route, &markup, reporter);
    debug!(stage = ?ScrapeStage::Done, trips = timetable.len());

    Ok(timetable)
}

/// Pairs up the times of every trip container on the page and drops repeats.
/// No containers on the page is an empty timetable, not an error.
pub fn extract_timetable(
    route: &RouteSpec,
    markup: &str,
    reporter: &mut dyn RunReporter,
) -> Vec<TimePair> {
    let html = Html::parse_document(markup);

    let containers = html.select(route.selectors.trip_container.selector()).collect_vec();
    debug!(stage = ?ScrapeStage::ContainersSelected, containers = containers.len());

    let pairs = containers
        .into_iter()
        .enumerate()
        .filter_map(
            |(i, container)| match pair_trip(container, route.selectors.time.selector(), i) {
                Pairing::Paired(pair) => Some(pair),
                Pairing::Incomplete(anomaly) => {
                    reporter.extraction_anomaly(route, &anomaly);
                    None
                }
                Pairing::Empty => None,
            },
        )
        .collect_vec();
    debug!(stage = ?ScrapeStage::PairsExtracted, pairs = pairs.len());

    let timetable = dedup_pairs(pairs);
    debug!(stage = ?ScrapeStage::Deduplicated, unique = timetable.len());

    timetable
}

#[derive(thiserror::Error, Debug)]
#[error("route failed after {stage:?}")]
pub struct RouteScrapeError {
    /// The last stage that was reached
    pub stage: ScrapeStage,
    #[source]
    pub source: AcquireError,
}
