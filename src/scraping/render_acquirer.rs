//! Responsible for turning a route url into page markup, either with a plain
//! request or with a headless browser for pages filled in by scripts
use std::{future::Future, time::Duration};

use futures::future::{FutureExt, LocalBoxFuture};
use reqwest::Client;
use thirtyfour::prelude::*;
use tokio::time::{Instant, sleep};
use tracing::{Instrument, info, info_span, warn};

use crate::{
    config::RendererConfig,
    model::{RenderStrategy, TripSelector},
};

/// Gets the rendered markup of a page.
///
/// `wait_for` is the trip container selector. Renderers that can wait for
/// content to show up wait for it, others ignore it.
pub trait PageRenderer {
    fn render<'a>(
        &'a self,
        url: &'a str,
        wait_for: &'a TripSelector,
    ) -> LocalBoxFuture<'a, Result<String, AcquireError>>;
}

/// Hands out the renderer a route asked for.
pub trait RendererPool {
    /// `None` if the requested renderer wasn't started for this run.
    fn renderer_for(&self, requested: Option<RenderStrategy>) -> Option<&dyn PageRenderer>;
}

pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(config: &RendererConfig) -> Result<Self, AcquireError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout())
            .build()
            .map_err(AcquireError::Client)?;

        Ok(HttpRenderer { client })
    }

    #[tracing::instrument(err, skip(self, _wait_for))]
    async fn fetch(&self, url: &str, _wait_for: &TripSelector) -> Result<String, AcquireError> {
        let fetch_error = |source| AcquireError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .instrument(info_span!("Fetching page"))
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_error)?;

        response
            .text()
            .instrument(info_span!("Reading body of response"))
            .await
            .map_err(fetch_error)
    }
}

impl PageRenderer for HttpRenderer {
    fn render<'a>(
        &'a self,
        url: &'a str,
        wait_for: &'a TripSelector,
    ) -> LocalBoxFuture<'a, Result<String, AcquireError>> {
        self.fetch(url, wait_for).boxed_local()
    }
}

/// A headless Chrome session, shared by every route of a run.
pub struct BrowserRenderer {
    driver: WebDriver,
    settle_delay: Duration,
    wait_timeout: Duration,
    poll_interval: Duration,
    fail_on_timeout: bool,
}

impl BrowserRenderer {
    /// Starts a session on the WebDriver server (chromedriver) from the config.
    #[tracing::instrument(err, skip(config), fields(webdriver_url = %config.webdriver_url))]
    pub async fn start(config: &RendererConfig) -> Result<Self, AcquireError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.set_headless().map_err(AcquireError::EngineStart)?;
        caps.add_arg(&format!("--user-agent={}", config.user_agent))
            .map_err(AcquireError::EngineStart)?;

        let driver = WebDriver::new(config.webdriver_url.as_str(), caps)
            .instrument(info_span!("Starting browser session"))
            .await
            .map_err(AcquireError::EngineStart)?;

        info!("browser session started");

        Ok(BrowserRenderer {
            driver,
            settle_delay: config.settle_delay(),
            wait_timeout: config.wait_timeout(),
            poll_interval: config.poll_interval(),
            fail_on_timeout: config.fail_on_timeout,
        })
    }

    #[tracing::instrument(err, skip(self, wait_for), fields(wait_for = %wait_for))]
    async fn navigate_and_wait(
        &self,
        url: &str,
        wait_for: &TripSelector,
    ) -> Result<String, AcquireError> {
        let browser_error = |source| AcquireError::Browser {
            url: url.to_string(),
            source,
        };

        self.driver
            .goto(url)
            .instrument(info_span!("Navigating"))
            .await
            .map_err(browser_error)?;

        sleep(self.settle_delay)
            .instrument(info_span!("Waiting for the page to settle"))
            .await;

        let driver = &self.driver;
        let css = wait_for.as_str();
        let appeared = poll_until(self.wait_timeout, self.poll_interval, || async move {
            driver
                .find_all(By::Css(css))
                .await
                .map(|elements| !elements.is_empty())
        })
        .instrument(info_span!("Waiting for trip containers"))
        .await
        .map_err(browser_error)?;

        let markup = self.driver.source().await.map_err(browser_error)?;

        settle_outcome(
            url,
            markup,
            appeared,
            self.fail_on_timeout,
            self.settle_delay + self.wait_timeout,
        )
    }

    /// Ends the browser session.
    #[tracing::instrument(err, skip(self))]
    pub async fn close(self) -> Result<(), AcquireError> {
        self.driver.quit().await.map_err(AcquireError::EngineStop)
    }
}

impl PageRenderer for BrowserRenderer {
    fn render<'a>(
        &'a self,
        url: &'a str,
        wait_for: &'a TripSelector,
    ) -> LocalBoxFuture<'a, Result<String, AcquireError>> {
        self.navigate_and_wait(url, wait_for).boxed_local()
    }
}

/// What a browser render ends with once the wait is over. Pages whose trip
/// containers never showed up are used as they are, unless `fail_on_timeout`.
fn settle_outcome(
    url: &str,
    markup: String,
    appeared: bool,
    fail_on_timeout: bool,
    waited: Duration,
) -> Result<String, AcquireError> {
    if appeared {
        return Ok(markup);
    }

    if fail_on_timeout {
        return Err(AcquireError::RenderTimeout {
            url: url.to_string(),
            waited,
        });
    }

    warn!("trip containers didn't show up within {waited:?}, using the page as it is");
    Ok(markup)
}

/// The renderers of one run. The browser only gets started when some route
/// needs it and it's closed again by [`Renderers::close`].
pub struct Renderers {
    default_strategy: RenderStrategy,
    http: HttpRenderer,
    browser: Option<BrowserRenderer>,
}

impl Renderers {
    pub async fn start(config: &RendererConfig, needs_browser: bool) -> Result<Self, AcquireError> {
        let http = HttpRenderer::new(config)?;
        let browser = if needs_browser {
            Some(BrowserRenderer::start(config).await?)
        } else {
            None
        };

        Ok(Renderers {
            default_strategy: config.default_strategy,
            http,
            browser,
        })
    }

    pub async fn close(self) -> Result<(), AcquireError> {
        match self.browser {
            Some(browser) => browser.close().await,
            None => Ok(()),
        }
    }
}

impl RendererPool for Renderers {
    fn renderer_for(&self, requested: Option<RenderStrategy>) -> Option<&dyn PageRenderer> {
        match requested.unwrap_or(self.default_strategy) {
            RenderStrategy::Http => Some(&self.http),
            RenderStrategy::Browser => self
                .browser
                .as_ref()
                .map(|browser| browser as &dyn PageRenderer),
        }
    }
}

/// Calls `probe` every `interval` until it returns true or `timeout` runs out.
/// Returns whether the probe ever succeeded. The probe is always called at
/// least once.
pub async fn poll_until<F, Fut, E>(
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<bool, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if probe().await? {
            return Ok(true);
        }

        if Instant::now() >= deadline {
            return Ok(false);
        }

        sleep(interval).await;
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AcquireError {
    #[error("couldn't build the http client")]
    Client(#[source] reqwest::Error),

    #[error("error fetching {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("browser error rendering {url}")]
    Browser {
        url: String,
        #[source]
        source: thirtyfour::error::WebDriverError,
    },

    #[error("trip containers never appeared on {url} within {waited:?}")]
    RenderTimeout { url: String, waited: Duration },

    #[error("couldn't start the browser")]
    EngineStart(#[source] thirtyfour::error::WebDriverError),

    #[error("couldn't close the browser")]
    EngineStop(#[source] thirtyfour::error::WebDriverError),

    #[error("the renderer asked for ({0:?}, None is the default) wasn't started for this run")]
    Unavailable(Option<RenderStrategy>),
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, convert::Infallible};

    use super::*;

    #[tokio::test]
    async fn test_poll_stops_once_probe_succeeds() -> Result<(), anyhow::Error> {
        let calls = Cell::new(0);

        let appeared = poll_until(Duration::from_secs(5), Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            let ready = calls.get() == 3;
            async move { Ok::<_, Infallible>(ready) }
        })
        .await?;

        assert!(appeared);
        assert_eq!(calls.get(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_poll_gives_up_after_timeout() -> Result<(), anyhow::Error> {
        let started = Instant::now();

        let appeared = poll_until(Duration::from_millis(30), Duration::from_millis(5), || async {
            Ok::<_, Infallible>(false)
        })
        .await?;

        assert!(!appeared);
        assert!(started.elapsed() >= Duration::from_millis(30));
        Ok(())
    }

    #[tokio::test]
    async fn test_poll_passes_probe_errors_on() {
        let result = poll_until(Duration::from_secs(1), Duration::from_millis(1), || async {
            Err::<bool, _>("gone")
        })
        .await;

        assert_eq!(result, Err("gone"));
    }

    const SPINNER: &str = "<html><body><div class=\"loading\"></div></body></html>";

    #[test]
    fn test_page_without_containers_is_used_anyway() -> Result<(), anyhow::Error> {
        let markup = settle_outcome(
            "https://example.com/2024-05-01",
            SPINNER.to_string(),
            false,
            false,
            Duration::from_secs(18),
        )?;

        assert_eq!(markup, SPINNER);
        Ok(())
    }

    #[test]
    fn test_page_without_containers_times_out_when_asked_to() {
        let result = settle_outcome(
            "https://example.com/2024-05-01",
            SPINNER.to_string(),
            false,
            true,
            Duration::from_secs(18),
        );

        match result {
            Err(AcquireError::RenderTimeout { url, waited }) => {
                assert_eq!(url, "https://example.com/2024-05-01");
                assert_eq!(waited, Duration::from_secs(18));
            }
            other => panic!("expected a render timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_page_with_containers_is_never_a_timeout() -> Result<(), anyhow::Error> {
        let markup = settle_outcome("https://example.com", SPINNER.to_string(), true, true, Duration::ZERO)?;

        assert_eq!(markup, SPINNER);
        Ok(())
    }

    #[tokio::test]
    async fn test_http_only_pool_has_no_browser() -> Result<(), anyhow::Error> {
        let config = RendererConfig {
            default_strategy: RenderStrategy::Http,
            ..Default::default()
        };
        let renderers = Renderers::start(&config, false).await?;

        assert!(renderers.renderer_for(None).is_some());
        assert!(renderers.renderer_for(Some(RenderStrategy::Http)).is_some());
        assert!(renderers.renderer_for(Some(RenderStrategy::Browser)).is_none());

        renderers.close().await?;
        Ok(())
    }
}
