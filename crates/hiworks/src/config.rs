//! Scraper configuration.
//!
//! A plain value constructed once and threaded into each component, rather
//! than a global settings singleton.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default entry point for the portal's login flow.
pub const DEFAULT_LOGIN_URL: &str = "https://login.office.hiworks.com/";

/// Base URL for the portal's calendar application.
pub const DEFAULT_CALENDAR_BASE_URL: &str = "https://calendar.office.hiworks.com";

/// Configuration for one scraper instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Login flow entry point.
    pub login_url: String,
    /// Base URL of the calendar application (no trailing slash).
    pub calendar_base_url: String,
    /// Tenant id used when URL-based resolution fails.
    pub default_tenant: Option<String>,
    /// WebDriver server address.
    pub webdriver_url: String,
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Bounded wait applied per selector strategy, in seconds.
    pub wait_timeout_secs: u64,
    /// Settle delay after navigation or submission, in seconds.
    pub settle_delay_secs: u64,
    /// Shorter delay after in-page transitions (view change, month nav).
    pub transition_delay_secs: u64,
    /// User agent presented by both the browser and the HTTP client.
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            calendar_base_url: DEFAULT_CALENDAR_BASE_URL.to_string(),
            default_tenant: None,
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            wait_timeout_secs: 30,
            settle_delay_secs: 3,
            transition_delay_secs: 2,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl ScraperConfig {
    /// Loads configuration from a JSON file.
    ///
    /// Missing keys fall back to their defaults; a missing file is an error
    /// so a typoed path is not silently ignored.
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: ScraperConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    pub fn transition_delay(&self) -> Duration {
        Duration::from_secs(self.transition_delay_secs)
    }

    /// URL of the schedule page for the given tenant.
    pub fn schedule_page_url(&self, tenant: &str) -> String {
        format!("{}/{}/schedule/schedulemain", self.calendar_base_url, tenant)
    }

    /// URL of the internal schedule-JSON endpoint for the given tenant.
    pub fn schedule_json_url(&self, tenant: &str) -> String {
        format!(
            "{}/{}/schedule/json/get_schedule_new",
            self.calendar_base_url, tenant
        )
    }
}
