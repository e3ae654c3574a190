//! WebDriver-backed browser session.
//!
//! Talks to a chromedriver instance over the WebDriver protocol. Driver
//! lifecycle configuration (headless flag, window size, anti-detection)
//! happens here so the rest of the core never sees `thirtyfour` types.

use super::{BrowserElement, BrowserSession, Locator};
use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use std::time::Duration;
use thirtyfour::error::WebDriverError;
use thirtyfour::{By, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver, WebElement};
use tokio::time::Instant;
use tracing::{info, warn};

/// Interval between location attempts inside a bounded wait.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

impl From<WebDriverError> for ScrapeError {
    fn from(err: WebDriverError) -> Self {
        ScrapeError::Browser {
            message: err.to_string(),
        }
    }
}

fn to_by(locator: &Locator) -> By {
    match locator {
        Locator::Css(s) => By::Css(s.clone()),
        Locator::XPath(s) => By::XPath(s.clone()),
        Locator::Name(s) => By::Name(s.clone()),
        Locator::ClassName(s) => By::ClassName(s.clone()),
    }
}

/// A Chrome session driven over the WebDriver protocol.
pub struct WebDriverSession {
    driver: WebDriver,
}

impl WebDriverSession {
    /// Connects to the WebDriver server and starts a configured Chrome
    /// session.
    pub async fn launch(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;
        caps.add_arg("--disable-gpu")?;
        caps.add_arg("--window-size=1920,1080")?;
        caps.add_arg("--disable-extensions")?;
        caps.add_arg("--disable-blink-features=AutomationControlled")?;
        caps.add_arg(&format!("--user-agent={}", config.user_agent))?;
        if config.headless {
            caps.add_arg("--headless=new")?;
            info!("launching browser in headless mode");
        } else {
            info!("launching browser with a visible window");
        }

        let driver = WebDriver::new(&config.webdriver_url, caps).await?;

        // The portal sniffs for automation; hide the webdriver flag.
        if let Err(e) = driver
            .execute(
                "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})",
                Vec::new(),
            )
            .await
        {
            warn!(error = %e, "failed to mask webdriver flag");
        }

        Ok(Self { driver })
    }
}

impl BrowserSession for WebDriverSession {
    type Element = WebDriverElementHandle;

    async fn goto(&self, url: &str) -> Result<(), ScrapeError> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn find(
        &self,
        locator: &Locator,
        wait: Duration,
    ) -> Result<Option<Self::Element>, ScrapeError> {
        let by = to_by(locator);
        let deadline = Instant::now() + wait;
        loop {
            match self.driver.find(by.clone()).await {
                Ok(element) => {
                    return Ok(Some(WebDriverElementHandle {
                        element,
                        driver: self.driver.clone(),
                    }))
                }
                Err(WebDriverError::NoSuchElement(_)) => {}
                Err(e) => return Err(e.into()),
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Element>, ScrapeError> {
        let elements = self.driver.find_all(to_by(locator)).await?;
        Ok(elements
            .into_iter()
            .map(|element| WebDriverElementHandle {
                element,
                driver: self.driver.clone(),
            })
            .collect())
    }

    async fn run_script(&self, script: &str) -> Result<(), ScrapeError> {
        self.driver.execute(script, Vec::new()).await?;
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<(String, String)>, ScrapeError> {
        let cookies = self.driver.get_all_cookies().await?;
        Ok(cookies
            .into_iter()
            .map(|c| (c.name, c.value))
            .collect())
    }

    async fn current_url(&self) -> Result<String, ScrapeError> {
        let url = self.driver.current_url().await?;
        Ok(url.to_string())
    }

    async fn title(&self) -> Result<String, ScrapeError> {
        Ok(self.driver.title().await?)
    }

    async fn close(self) -> Result<(), ScrapeError> {
        self.driver.quit().await?;
        info!("browser session closed");
        Ok(())
    }
}

/// A located element plus the driver handle needed for script-based
/// interactions.
pub struct WebDriverElementHandle {
    element: WebElement,
    driver: WebDriver,
}

impl BrowserElement for WebDriverElementHandle {
    async fn click(&self) -> Result<(), ScrapeError> {
        self.element.click().await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), ScrapeError> {
        self.element.clear().await?;
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), ScrapeError> {
        self.element.send_keys(text).await?;
        Ok(())
    }

    async fn submit_form(&self) -> Result<(), ScrapeError> {
        // The W3C protocol has no submit endpoint; submit the enclosing
        // form from script instead.
        self.driver
            .execute(
                "if (arguments[0].form) { arguments[0].form.submit(); }",
                vec![self.element.to_json()?],
            )
            .await?;
        Ok(())
    }

    async fn text(&self) -> Result<String, ScrapeError> {
        Ok(self.element.text().await?)
    }
}
