//! Browser automation capability interface.
//!
//! The login state machine and extraction logic depend only on these traits,
//! so they can be exercised against a fake session without a real browser.
//! The production implementation lives in [`webdriver`].

pub mod webdriver;

use crate::error::ScrapeError;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// A strategy for locating an element.
///
/// The portal's element identifiers are not contractually stable, so callers
/// assemble ordered chains of these and take the first that resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
    Name(String),
    ClassName(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Locator::Name(name.into())
    }

    pub fn class_name(name: impl Into<String>) -> Self {
        Locator::ClassName(name.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css:{s}"),
            Locator::XPath(s) => write!(f, "xpath:{s}"),
            Locator::Name(s) => write!(f, "name:{s}"),
            Locator::ClassName(s) => write!(f, "class:{s}"),
        }
    }
}

/// A located element within a browser session.
#[allow(async_fn_in_trait)]
pub trait BrowserElement {
    async fn click(&self) -> Result<(), ScrapeError>;
    async fn clear(&self) -> Result<(), ScrapeError>;
    async fn type_text(&self, text: &str) -> Result<(), ScrapeError>;
    /// Submits the enclosing form directly, bypassing any submit button.
    async fn submit_form(&self) -> Result<(), ScrapeError>;
    async fn text(&self) -> Result<String, ScrapeError>;
}

/// An authenticated (or authenticating) browser session.
///
/// All waits are bounded: `find` blocks up to `wait` before reporting the
/// element as absent with `Ok(None)`. One session serves one scraper
/// instance; sharing across concurrent callers is unsupported.
#[allow(async_fn_in_trait)]
pub trait BrowserSession {
    type Element: BrowserElement;

    async fn goto(&self, url: &str) -> Result<(), ScrapeError>;

    /// Locates the first element matching `locator`, waiting up to `wait`.
    async fn find(
        &self,
        locator: &Locator,
        wait: Duration,
    ) -> Result<Option<Self::Element>, ScrapeError>;

    /// Returns all elements currently matching `locator`, without waiting.
    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Element>, ScrapeError>;

    async fn run_script(&self, script: &str) -> Result<(), ScrapeError>;

    /// Snapshot of all cookies as name/value pairs.
    async fn cookies(&self) -> Result<Vec<(String, String)>, ScrapeError>;

    async fn current_url(&self) -> Result<String, ScrapeError>;

    async fn title(&self) -> Result<String, ScrapeError>;

    /// Releases the browser resource. The only teardown path; callers must
    /// reach it on every exit route or leak the browser process.
    async fn close(self) -> Result<(), ScrapeError>;
}

/// Evaluates an ordered fallback chain of locator strategies.
///
/// Each strategy gets the full bounded wait; the first that resolves wins.
/// Returns the winning strategy's index alongside the element so callers can
/// log which one worked, or `None` when the whole chain is exhausted.
pub async fn find_first<B: BrowserSession>(
    browser: &B,
    chain: &[Locator],
    wait: Duration,
) -> Result<Option<(usize, B::Element)>, ScrapeError> {
    for (idx, locator) in chain.iter().enumerate() {
        if let Some(element) = browser.find(locator, wait).await? {
            debug!(%locator, strategy = idx, "selector strategy resolved");
            return Ok(Some((idx, element)));
        }
        debug!(%locator, strategy = idx, "selector strategy exhausted");
    }
    Ok(None)
}

/// Like [`find_first`] but treats chain exhaustion as an error.
pub async fn find_required<B: BrowserSession>(
    browser: &B,
    chain: &[Locator],
    wait: Duration,
    what: &str,
) -> Result<B::Element, ScrapeError> {
    match find_first(browser, chain, wait).await? {
        Some((_, element)) => Ok(element),
        None => Err(ScrapeError::ElementNotFound {
            what: what.to_string(),
        }),
    }
}
