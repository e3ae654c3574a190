//! Session-to-HTTP bridge.
//!
//! Browser automation is only needed to establish an authenticated session;
//! once that exists, replaying its cookies through a plain HTTP client is
//! far cheaper and more reliable than driving the calendar UI. The bridge
//! snapshots the session's cookies into a `reqwest` jar and POSTs directly
//! to the portal's internal schedule-JSON endpoint.

use crate::config::ScraperConfig;
use crate::error::{body_preview, ScrapeError};
use crate::types::SessionCookies;
use reqwest::cookie::Jar;
use reqwest::header::REFERER;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Host from which the tenant id can be read off the URL path.
const LOGIN_HOST: &str = "login.office.hiworks.com";

/// Body substring the portal uses to ask for a fresh login.
const RELOGIN_MARKER: &str = "다시 로그인";

/// Extracts the tenant/company identifier from a portal URL.
///
/// Only URLs on the known login host carry the tenant as their first path
/// segment (e.g. `https://login.office.hiworks.com/acme.com/step2`).
pub fn tenant_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if parsed.host_str() != Some(LOGIN_HOST) {
        return None;
    }
    parsed
        .path_segments()?
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Validates a schedule-endpoint response body and parses it as JSON.
///
/// Checked in order: empty body, HTML-shaped or re-login body (an expired
/// session), then JSON parse. Never panics past this boundary.
pub fn validate_schedule_body(body: &str) -> Result<Value, ScrapeError> {
    let trimmed = body.trim_start();
    if trimmed.is_empty() {
        return Err(ScrapeError::EmptyResponse);
    }
    if trimmed.starts_with("<!DOCTYPE html")
        || trimmed.starts_with("<html")
        || body.contains(RELOGIN_MARKER)
    {
        return Err(ScrapeError::SessionExpired);
    }
    serde_json::from_str(body).map_err(|e| ScrapeError::MalformedResponse {
        reason: e.to_string(),
        body_preview: body_preview(body),
    })
}

/// HTTP client addressing one tenant's schedule endpoint with a cookie
/// snapshot taken from the browser session.
///
/// The snapshot is an independent copy; after any re-login the client must
/// be rebuilt from fresh cookies.
pub struct ScheduleClient {
    http: Client,
    endpoint_url: String,
    referer: String,
}

impl ScheduleClient {
    /// Builds a client owning a copy of the session's cookies.
    pub fn new(
        cookies: &SessionCookies,
        tenant_id: &str,
        config: &ScraperConfig,
    ) -> Result<Self, ScrapeError> {
        let base_url: Url = config.calendar_base_url.parse()?;
        let jar = Arc::new(Jar::default());
        for (name, value) in cookies.pairs() {
            jar.add_cookie_str(&format!("{name}={value}; Domain=.office.hiworks.com"), &base_url);
        }

        let http = Client::builder()
            .cookie_provider(jar)
            .user_agent(&config.user_agent)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;

        info!(
            cookie_count = cookies.len(),
            %tenant_id,
            "schedule client built from session cookie snapshot"
        );

        Ok(Self {
            http,
            endpoint_url: config.schedule_json_url(tenant_id),
            referer: config.schedule_page_url(tenant_id),
        })
    }

    /// Fetches the schedule JSON for `[start, end)` (opaque `YYYY-MM-DD`
    /// strings; range semantics are the portal's).
    ///
    /// Returns the parsed payload unchanged; reshaping into rows is the
    /// caller's concern.
    pub async fn fetch_range(&self, start: &str, end: &str) -> Result<Value, ScrapeError> {
        info!(%start, %end, url = %self.endpoint_url, "requesting schedule JSON");

        let response = self
            .http
            .post(&self.endpoint_url)
            .header(REFERER, &self.referer)
            .form(&[
                ("accesstype", "S"),
                ("syncflag", "N"),
                ("hid", ""),
                ("birthday_show_flag", "N"),
                ("id", "calendar"),
                ("start", start),
                ("end", end),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "schedule endpoint returned non-success status");
            return Err(ScrapeError::Transport {
                message: format!("schedule endpoint returned status {status}"),
            });
        }

        let body = response.text().await?;
        let payload = validate_schedule_body(&body)?;
        info!(body_len = body.len(), "schedule JSON received");
        Ok(payload)
    }
}
