use std::fmt;

use scraper::Selector;
use serde::{Deserialize, Serialize};

/// A route as it's described in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteSpec {
    /// Display name, also the key of the route in the snapshot
    pub name: String,
    /// Page url with a `{date}` placeholder for the day being scraped
    pub url_template: String,
    pub departure_station: String,
    pub arrival_station: String,
    pub selectors: RouteSelectors,
    /// Overrides the global render strategy for this route
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<RenderStrategy>,
}

impl RouteSpec {
    /// Fills the `{date}` placeholder. The date is expected as `YYYY-MM-DD`.
    pub fn url_for_date(&self, date: &str) -> String {
        self.url_template.replace("{date}", date)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteSelectors {
    /// Matches the smallest fragment holding exactly one trip
    pub trip_container: TripSelector,
    /// Matches the time-bearing elements inside a trip container
    #[serde(default = "RouteSelectors::default_time")]
    pub time: TripSelector,
}

impl RouteSelectors {
    fn default_time() -> TripSelector {
        TripSelector::parse(".time-departure, .time-arrival")
            .expect("the default time selector is valid css")
    }
}

/// How a route's page gets turned into markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStrategy {
    /// Plain GET, for pages rendered server side
    Http,
    /// Headless browser, for pages filled in by scripts after load
    Browser,
}

/// A CSS selector that was checked when the config got loaded.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TripSelector {
    source: String,
    selector: Selector,
}

impl TripSelector {
    pub fn parse(source: &str) -> Result<Self, InvalidSelectorError> {
        let selector = Selector::parse(source).map_err(|e| InvalidSelectorError {
            selector: source.to_string(),
            reason: e.to_string(),
        })?;

        Ok(TripSelector {
            source: source.to_string(),
            selector,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl TryFrom<String> for TripSelector {
    type Error = InvalidSelectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TripSelector::parse(&value)
    }
}

impl From<TripSelector> for String {
    fn from(value: TripSelector) -> Self {
        value.source
    }
}

impl fmt::Debug for TripSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TripSelector").field(&self.source).finish()
    }
}

impl fmt::Display for TripSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(thiserror::Error, Debug)]
#[error("invalid selector `{selector}`: {reason}")]
pub struct InvalidSelectorError {
    pub selector: String,
    pub reason: String,
}
