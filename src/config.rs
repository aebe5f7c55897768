//! Loading and bootstrapping of the JSON config file

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::model::{InvalidSelectorError, RenderStrategy, RouteSelectors, RouteSpec, TripSelector};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub routes: Vec<RouteSpec>,
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: PathBuf,
    /// Local time of day the daemon runs the job at, `HH:MM`
    #[serde(default = "default_scrape_time")]
    pub scrape_time: String,
    #[serde(default)]
    pub renderer: RendererConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Used by routes that don't pick a strategy themselves
    pub default_strategy: RenderStrategy,
    pub webdriver_url: String,
    pub user_agent: String,
    pub request_timeout_ms: u64,
    /// Wait after navigation before looking at the page
    pub settle_delay_ms: u64,
    /// How long to poll for the trip containers after settling
    pub wait_timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Fail the route instead of using whatever markup loaded
    pub fail_on_timeout: bool,
}

impl RendererConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        RendererConfig {
            default_strategy: RenderStrategy::Browser,
            webdriver_url: "http://localhost:9515".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            request_timeout_ms: 10_000,
            settle_delay_ms: 3_000,
            wait_timeout_ms: 15_000,
            poll_interval_ms: 500,
            fail_on_timeout: false,
        }
    }
}

fn default_output_file() -> PathBuf {
    PathBuf::from("timetable.html")
}

fn default_snapshot_file() -> PathBuf {
    PathBuf::from("timetable_data.json")
}

fn default_scrape_time() -> String {
    "06:00".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            routes: vec![
                elron_route("Laagri", "Tallinn"),
                elron_route("Tallinn", "Laagri"),
            ],
            output_file: default_output_file(),
            snapshot_file: default_snapshot_file(),
            scrape_time: default_scrape_time(),
            renderer: RendererConfig::default(),
        }
    }
}

fn elron_route(from: &str, to: &str) -> RouteSpec {
    let selector = |css: &str| TripSelector::parse(css).expect("default selectors are valid css");

    RouteSpec {
        name: format!("{from} to {to}"),
        url_template: format!("https://elron.pilet.ee/et/otsing/{from}/{to}/{{date}}"),
        departure_station: from.to_string(),
        arrival_station: to.to_string(),
        selectors: RouteSelectors {
            trip_container: selector(".trip"),
            time: selector(".time-departure, .time-arrival"),
        },
        renderer: None,
    }
}

impl Config {
    /// Reads the config at `path`.
    ///
    /// A missing file gets the defaults written to it. A file that can't be
    /// read, isn't JSON or doesn't fit the config layout is logged and the
    /// defaults are used without touching it. Malformed selectors, duplicate
    /// route names and a bad `scrape_time` are returned as errors.
    #[tracing::instrument(err)]
    pub fn load_or_bootstrap(path: &Path) -> Result<Self, ConfigError> {
        let config = match Self::read(path) {
            Ok(config) => config,
            Err(ConfigError::Missing { .. }) => {
                info!("Config file {} not found. Creating default config.", path.display());
                let config = Config::default();
                config.write(path)?;
                config
            }
            Err(e) if e.is_recoverable() => {
                error!("{e}, falling back to the default config");
                Config::default()
            }
            Err(e) => return Err(e),
        };

        config.validate()?;

        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ConfigError::Missing {
                path: path.to_path_buf(),
            },
            _ => ConfigError::Read {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let parse_error = |source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let value: Value = serde_json::from_str(&contents).map_err(parse_error)?;
        check_selectors(&value)?;

        serde_json::from_value(value).map_err(parse_error)
    }

    fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Selectors are already checked while deserializing, this covers the rest.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for route in &self.routes {
            if !names.insert(route.name.as_str()) {
                return Err(ConfigError::DuplicateRoute(route.name.clone()));
            }
        }

        self.scrape_time()?;

        Ok(())
    }

    pub fn scrape_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(&self.scrape_time, "%H:%M")
            .map_err(|_| ConfigError::InvalidScrapeTime(self.scrape_time.clone()))
    }

    pub fn needs_browser(&self) -> bool {
        self.routes.iter().any(|r| {
            r.renderer.unwrap_or(self.renderer.default_strategy) == RenderStrategy::Browser
        })
    }
}

/// Parses every selector string of every route, so a typo in one is reported
/// as such even when something else in the file is wrong too.
fn check_selectors(value: &Value) -> Result<(), InvalidSelectorError> {
    let selectors = value["routes"]
        .as_array()
        .into_iter()
        .flatten()
        .flat_map(|route| [&route["selectors"]["trip_container"], &route["selectors"]["time"]])
        .filter_map(Value::as_str);

    for selector in selectors {
        TripSelector::parse(selector)?;
    }

    Ok(())
}

impl ConfigError {
    fn is_recoverable(&self) -> bool {
        matches!(self, ConfigError::Read { .. } | ConfigError::Parse { .. })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file {} doesn't exist", path.display())]
    Missing { path: PathBuf },

    #[error("couldn't read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("couldn't parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("couldn't write config file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    InvalidSelector(#[from] InvalidSelectorError),

    #[error("route name `{0}` is used more than once")]
    DuplicateRoute(String),

    #[error("scrape time `{0}` isn't HH:MM")]
    InvalidScrapeTime(String),
}
