use serde::Serialize;

use super::route_spec::RouteSpec;

/// One trip, both times as zero padded `HH:MM`.
///
/// Warning: the hour can be larger than 23 for trips running past midnight
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TimePair {
    pub departure: String,
    pub arrival: String,
}

impl TimePair {
    pub fn new(departure: impl Into<String>, arrival: impl Into<String>) -> Self {
        TimePair {
            departure: departure.into(),
            arrival: arrival.into(),
        }
    }
}

/// The scraped timetable of one route for one run.
#[derive(Debug, Clone, Serialize)]
pub struct RouteResult {
    /// Used as the key in the snapshot, so not part of the value
    #[serde(skip)]
    pub name: String,
    pub departure_station: String,
    pub arrival_station: String,
    pub timetable: Vec<TimePair>,
}

impl RouteResult {
    pub fn new(route: &RouteSpec, timetable: Vec<TimePair>) -> Self {
        RouteResult {
            name: route.name.clone(),
            departure_station: route.departure_station.clone(),
            arrival_station: route.arrival_station.clone(),
            timetable,
        }
    }

    /// What a route ends up as when scraping it failed.
    pub fn empty(route: &RouteSpec) -> Self {
        RouteResult::new(route, vec![])
    }
}
