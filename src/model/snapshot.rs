use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use super::timetable::RouteResult;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything scraped in one run. Serialized it looks like
/// `{"last_updated": "...", "routes": {"<name>": {...}}}`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub last_updated: String,
    /// In config order
    #[serde(serialize_with = "routes_as_map")]
    pub routes: Vec<RouteResult>,
}

impl RunSnapshot {
    pub fn new(taken_at: DateTime<Local>) -> Self {
        RunSnapshot {
            last_updated: taken_at.format(TIMESTAMP_FORMAT).to_string(),
            routes: vec![],
        }
    }

    pub fn push(&mut self, route: RouteResult) {
        self.routes.push(route);
    }

    pub fn route(&self, name: &str) -> Option<&RouteResult> {
        self.routes.iter().find(|r| r.name == name)
    }
}

fn routes_as_map<S>(routes: &[RouteResult], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(routes.iter().map(|r| (&r.name, r)))
}
