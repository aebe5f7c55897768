//! Stand-ins for the network and the browser

use std::collections::HashMap;

use futures::future::{FutureExt, LocalBoxFuture};

use super::{
    AcquireError, PageRenderer, RendererPool, RouteScrapeError, RunReporter, ScrapeStage,
};
use crate::{
    extraction::ExtractionAnomaly,
    model::{RenderStrategy, RouteSelectors, RouteSpec, TripSelector},
};

pub fn route(name: &str, url_template: &str) -> RouteSpec {
    let (from, to) = name.split_once(" to ").unwrap_or((name, name));

    RouteSpec {
        name: name.to_string(),
        url_template: url_template.to_string(),
        departure_station: from.to_string(),
        arrival_station: to.to_string(),
        selectors: RouteSelectors {
            trip_container: TripSelector::parse(".trip").unwrap(),
            time: TripSelector::parse(".time-departure, .time-arrival").unwrap(),
        },
        renderer: None,
    }
}

/// Serves canned pages by url. Unknown urls render as an empty page, like a
/// browser page whose scripts never filled anything in.
#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, Option<String>>,
    no_renderer: bool,
}

impl FakeSite {
    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), Some(html.to_string()));
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), None);
        self
    }

    pub fn without_renderer(mut self) -> Self {
        self.no_renderer = true;
        self
    }
}

impl PageRenderer for FakeSite {
    fn render<'a>(
        &'a self,
        url: &'a str,
        _wait_for: &'a TripSelector,
    ) -> LocalBoxFuture<'a, Result<String, AcquireError>> {
        let page = match self.pages.get(url) {
            Some(Some(html)) => Ok(html.clone()),
            Some(None) => Err(AcquireError::Fetch {
                url: url.to_string(),
                source: reqwest::Client::new()
                    .get("not a url")
                    .build()
                    .unwrap_err(),
            }),
            None => Ok("<html><head></head><body></body></html>".to_string()),
        };

        async move { page }.boxed_local()
    }
}

impl RendererPool for FakeSite {
    fn renderer_for(&self, _requested: Option<RenderStrategy>) -> Option<&dyn PageRenderer> {
        if self.no_renderer {
            None
        } else {
            Some(self)
        }
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub started: Vec<String>,
    pub anomalies: Vec<(String, usize)>,
    pub finished: Vec<(String, usize)>,
    pub failed: Vec<(String, ScrapeStage)>,
}

impl RunReporter for RecordingReporter {
    fn route_started(&mut self, _route: &RouteSpec, url: &str) {
        self.started.push(url.to_string());
    }

    fn extraction_anomaly(&mut self, route: &RouteSpec, anomaly: &ExtractionAnomaly) {
        self.anomalies
            .push((route.name.clone(), anomaly.container_index));
    }

    fn route_finished(&mut self, route: &RouteSpec, trips: usize) {
        self.finished.push((route.name.clone(), trips));
    }

    fn route_failed(&mut self, route: &RouteSpec, error: &RouteScrapeError) {
        self.failed.push((route.name.clone(), error.stage));
    }
}
