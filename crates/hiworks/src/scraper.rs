//! Scraper orchestration.
//!
//! Ties login, calendar driving, DOM extraction and the JSON bridge together
//! around one browser session. One scraper instance owns one session; there
//! is no internal concurrency and every wait is bounded.

use crate::browser::{find_first, BrowserElement, BrowserSession, Locator};
use crate::bridge::{tenant_from_url, ScheduleClient};
use crate::config::ScraperConfig;
use crate::credentials::Credentials;
use crate::error::ScrapeError;
use crate::login::{LoginFlow, LoginState};
use crate::parser;
use crate::types::{ExtractionResult, ScheduleRow, SessionCookies, NO_PERIOD_INFO};
use serde_json::Value;
use tracing::{info, warn};

/// Calendar view modes the portal's list UI supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Monthly,
    Weekly,
    Daily,
    /// Month-granularity list view; what extraction expects.
    List,
}

impl ViewMode {
    fn script_param(self) -> &'static str {
        match self {
            ViewMode::Monthly | ViewMode::List => "listMonth",
            ViewMode::Weekly => "listWeek",
            ViewMode::Daily => "listDay",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ViewMode::Monthly => "월간",
            ViewMode::Weekly => "주간",
            ViewMode::Daily => "일간",
            ViewMode::List => "목록",
        }
    }
}

fn day_cell_chains() -> Vec<Locator> {
    vec![
        Locator::class_name("s_day"),
        Locator::css(".fc-daygrid-day"),
        Locator::css(".fc-list-day"),
        Locator::css(".schedule-day"),
        Locator::css(".day-item"),
        Locator::xpath("//div[contains(@class, 'day')]"),
    ]
}

fn period_label_chain() -> Vec<Locator> {
    vec![
        Locator::css(".fc-toolbar .fc-center h2"),
        Locator::css(".fc-center h2"),
        Locator::xpath(
            "//div[contains(@class, 'fc-toolbar')]//div[contains(@class, 'fc-center')]//h2",
        ),
        Locator::xpath("//h2[contains(@class, 'fc-toolbar-chunk')]"),
    ]
}

fn view_dropdown_chain() -> Vec<Locator> {
    vec![
        Locator::xpath("//a[contains(@href, 'HiworksEvent.drop_view')]"),
        Locator::xpath("//a[contains(text(), '보기')]"),
        Locator::xpath("//a[contains(text(), '월간')]"),
        Locator::xpath("//a[contains(text(), '주간')]"),
        Locator::xpath("//a[contains(text(), '일간')]"),
    ]
}

fn view_option_chain(label: &str) -> Vec<Locator> {
    vec![
        Locator::xpath(format!("//a[contains(text(), '{label}')]")),
        Locator::xpath(format!("//div[contains(text(), '{label}')]")),
        Locator::xpath(format!("//span[contains(text(), '{label}')]")),
    ]
}

/// Drives one browser session against the portal.
pub struct HiworksScraper<B> {
    browser: B,
    config: ScraperConfig,
    tenant_id: Option<String>,
    logged_in: bool,
}

impl<B: BrowserSession> HiworksScraper<B> {
    pub fn new(browser: B, config: ScraperConfig) -> Self {
        let tenant_id = config.default_tenant.clone();
        Self {
            browser,
            config,
            tenant_id,
            logged_in: false,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Runs the two-step login flow and caches the resolved tenant id.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), ScrapeError> {
        let mut flow = LoginFlow::new(&self.browser, &self.config);
        let result = flow.run(credentials).await;

        // Keep the tenant even when the verdict fails; the URL already
        // revealed it after the username step.
        if let Some(tenant) = flow.tenant_id() {
            self.tenant_id = Some(tenant.to_string());
        }

        self.logged_in = flow.state() == LoginState::Authenticated;
        result
    }

    /// Navigates to the schedule page of the resolved tenant.
    pub async fn open_schedule_page(&self) -> Result<(), ScrapeError> {
        let tenant = self.require_tenant()?;
        let url = self.config.schedule_page_url(tenant);
        info!(%url, "navigating to schedule page");
        self.browser.goto(&url).await?;
        tokio::time::sleep(self.config.settle_delay()).await;

        let current = self.browser.current_url().await?;
        if !current.to_lowercase().contains("schedule") {
            return Err(ScrapeError::Browser {
                message: format!("schedule page not reached, landed on {current}"),
            });
        }
        Ok(())
    }

    /// Switches the calendar view, preferring the portal's own script hook
    /// and falling back to clicking through the view dropdown.
    pub async fn change_view_mode(&self, mode: ViewMode) -> Result<(), ScrapeError> {
        let script = format!(
            "HiworksEvent.calendar_change_view('{}');",
            mode.script_param()
        );
        match self.browser.run_script(&script).await {
            Ok(()) => {
                info!(mode = mode.label(), "view mode changed via script");
            }
            Err(e) => {
                warn!(error = %e, "view-change script failed, trying dropdown");
                self.change_view_mode_fallback(mode).await?;
            }
        }
        tokio::time::sleep(self.config.transition_delay()).await;
        Ok(())
    }

    async fn change_view_mode_fallback(&self, mode: ViewMode) -> Result<(), ScrapeError> {
        let wait = self.config.wait_timeout();
        let dropdown = match find_first(&self.browser, &view_dropdown_chain(), wait).await? {
            Some((_, element)) => element,
            None => {
                return Err(ScrapeError::ElementNotFound {
                    what: "view mode dropdown".to_string(),
                })
            }
        };
        dropdown.click().await?;

        let option = match find_first(&self.browser, &view_option_chain(mode.label()), wait).await?
        {
            Some((_, element)) => element,
            None => {
                return Err(ScrapeError::ElementNotFound {
                    what: format!("view mode option '{}'", mode.label()),
                })
            }
        };
        option.click().await?;
        info!(mode = mode.label(), "view mode changed via dropdown");
        Ok(())
    }

    /// Extracts schedule rows from the rendered calendar.
    ///
    /// Rows follow DOM traversal order, which matches the rendered calendar
    /// date order. Cells whose text yields nothing are skipped, not errors.
    pub async fn extract_schedule(&self) -> Result<ExtractionResult, ScrapeError> {
        let period_label = self.extract_period_label().await;

        let mut cells = Vec::new();
        for locator in day_cell_chains() {
            cells = self.browser.find_all(&locator).await?;
            if !cells.is_empty() {
                info!(%locator, count = cells.len(), "found schedule day cells");
                break;
            }
        }

        if cells.is_empty() {
            warn!("no schedule day cells found with any selector");
            return Ok(ExtractionResult::failed(
                period_label,
                "no schedule elements found",
            ));
        }

        let mut rows: Vec<ScheduleRow> = Vec::new();
        for cell in &cells {
            let text = match cell.text().await {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "failed to read day cell text, skipping");
                    continue;
                }
            };
            rows.extend(parser::parse_schedule_text(&text));
        }

        info!(rows = rows.len(), "schedule extraction finished");
        Ok(ExtractionResult::ok(rows, period_label))
    }

    async fn extract_period_label(&self) -> String {
        // Best effort; a short per-strategy wait keeps this from dominating
        // the extraction pass when the toolbar is absent.
        let wait = std::cmp::min(
            self.config.wait_timeout(),
            std::time::Duration::from_secs(2),
        );
        match find_first(&self.browser, &period_label_chain(), wait).await {
            Ok(Some((_, element))) => match element.text().await {
                Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
                _ => NO_PERIOD_INFO.to_string(),
            },
            _ => NO_PERIOD_INFO.to_string(),
        }
    }

    /// Moves the calendar to the previous month.
    pub async fn previous_month(&self) -> Result<(), ScrapeError> {
        self.browser
            .run_script(r#"HiworksSchedule.prev("calendar");"#)
            .await?;
        tokio::time::sleep(self.config.transition_delay()).await;
        Ok(())
    }

    /// Moves the calendar to the next month.
    pub async fn next_month(&self) -> Result<(), ScrapeError> {
        self.browser
            .run_script(r#"HiworksSchedule.next("calendar");"#)
            .await?;
        tokio::time::sleep(self.config.transition_delay()).await;
        Ok(())
    }

    /// Takes a point-in-time snapshot of the session's cookies.
    pub async fn snapshot_cookies(&self) -> Result<SessionCookies, ScrapeError> {
        let pairs = self.browser.cookies().await?;
        Ok(SessionCookies::from_pairs(pairs))
    }

    /// Fetches the schedule JSON for `[start, end)` by cookie replay,
    /// without driving the calendar UI.
    pub async fn fetch_schedule_json(
        &mut self,
        start: &str,
        end: &str,
    ) -> Result<Value, ScrapeError> {
        self.resolve_tenant().await?;
        let tenant = self.require_tenant()?.to_string();
        let cookies = self.snapshot_cookies().await?;
        let client = ScheduleClient::new(&cookies, &tenant, &self.config)?;
        client.fetch_range(start, end).await
    }

    /// Resolves the tenant id from the current URL if it is not cached yet.
    async fn resolve_tenant(&mut self) -> Result<(), ScrapeError> {
        if self.tenant_id.is_some() {
            return Ok(());
        }
        let url = self.browser.current_url().await?;
        if let Some(tenant) = tenant_from_url(&url) {
            info!(%tenant, "tenant id resolved from current URL");
            self.tenant_id = Some(tenant);
        }
        Ok(())
    }

    fn require_tenant(&self) -> Result<&str, ScrapeError> {
        self.tenant_id.as_deref().ok_or_else(|| ScrapeError::Config {
            message: "tenant id unresolved and no default configured".to_string(),
        })
    }

    /// Releases the browser session. Must run on every exit path; skipping
    /// it leaks the browser process.
    pub async fn shutdown(self) -> Result<(), ScrapeError> {
        self.browser.close().await
    }
}
