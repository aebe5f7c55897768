//! Where the scraper tells about what happened to each route during a run

use tracing::{error, info, warn};

use super::RouteScrapeError;
use crate::{extraction::ExtractionAnomaly, model::RouteSpec, utils::error_chain};

pub trait RunReporter {
    fn route_started(&mut self, route: &RouteSpec, url: &str);

    fn extraction_anomaly(&mut self, route: &RouteSpec, anomaly: &ExtractionAnomaly);

    fn route_finished(&mut self, route: &RouteSpec, trips: usize);

    fn route_failed(&mut self, route: &RouteSpec, error: &RouteScrapeError);
}

/// Sends everything to `tracing`, tagged with the route.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl RunReporter for TracingReporter {
    fn route_started(&mut self, route: &RouteSpec, url: &str) {
        info!(route = %route.name, "Scraping {} from {url}", route.name);
    }

    fn extraction_anomaly(&mut self, route: &RouteSpec, anomaly: &ExtractionAnomaly) {
        warn!(
            route = %route.name,
            container = anomaly.container_index,
            "trip container only had one time ({}), discarding it",
            anomaly.lone_time
        );
    }

    fn route_finished(&mut self, route: &RouteSpec, trips: usize) {
        info!(route = %route.name, "Found {trips} schedules for {}", route.name);
    }

    fn route_failed(&mut self, route: &RouteSpec, error: &RouteScrapeError) {
        error!(
            route = %route.name,
            "Error scraping {}: {}",
            route.name,
            error_chain(error)
        );
    }
}
