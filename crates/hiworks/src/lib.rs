//! Schedule scraper for the Hiworks office portal.
//!
//! Drives a real browser only where it has to (the two-step login), then
//! bridges the authenticated session into plain HTTP by replaying its
//! cookies against the portal's internal schedule-JSON endpoint. A text
//! parser turns rendered calendar cells into structured rows for the DOM
//! fallback path.

pub mod bridge;
pub mod browser;
pub mod config;
pub mod credentials;
pub mod error;
pub mod export;
pub mod login;
pub mod parser;
pub mod scraper;
pub mod types;

pub use bridge::{tenant_from_url, validate_schedule_body, ScheduleClient};
pub use browser::{BrowserElement, BrowserSession, Locator};
pub use config::ScraperConfig;
pub use credentials::{CredentialStore, Credentials};
pub use error::ScrapeError;
pub use login::{judge_login_success, LoginFlow, LoginState};
pub use scraper::{HiworksScraper, ViewMode};
pub use types::{rows_from_json, ExtractionResult, ScheduleRow, SessionCookies};
