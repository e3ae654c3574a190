//! Error types for the scraper core.

use thiserror::Error;

/// Maximum number of bytes of a response body kept in error diagnostics.
pub const BODY_PREVIEW_LIMIT: usize = 256;

/// Errors that can occur while driving the portal or replaying its endpoints.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Every selector strategy for a required UI element was exhausted
    /// within the bounded wait.
    #[error("element not found: {what}")]
    ElementNotFound { what: String },

    /// The login state machine reached its `Failed` state.
    #[error("authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    /// The portal answered with a login page or a re-login marker; the
    /// browser session must be redriven through the login flow.
    #[error("session expired, re-login required")]
    SessionExpired,

    /// Success status but a zero-length body.
    #[error("empty response from schedule endpoint")]
    EmptyResponse,

    /// JSON parse failure on a non-empty, non-HTML body.
    #[error("malformed response: {reason} (body: {body_preview:?})")]
    MalformedResponse {
        reason: String,
        body_preview: String,
    },

    /// Non-2xx status or network-level failure.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// WebDriver-level failure outside element location.
    #[error("browser error: {message}")]
    Browser { message: String },

    /// Missing or unresolvable configuration, e.g. no tenant id.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl ScrapeError {
    /// Returns true if the browser session must be re-authenticated before
    /// the failed operation can be retried.
    pub fn needs_relogin(&self) -> bool {
        matches!(
            self,
            ScrapeError::SessionExpired | ScrapeError::AuthenticationFailed { .. }
        )
    }

    /// Returns true if this error is potentially transient and retryable
    /// without re-authentication.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScrapeError::Transport { .. } | ScrapeError::EmptyResponse
        )
    }
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        ScrapeError::Transport {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for ScrapeError {
    fn from(err: url::ParseError) -> Self {
        ScrapeError::Config {
            message: format!("invalid URL: {err}"),
        }
    }
}

/// Truncates a body for diagnostics without splitting a UTF-8 character.
pub fn body_preview(body: &str) -> String {
    if body.len() <= BODY_PREVIEW_LIMIT {
        return body.to_string();
    }
    let mut end = BODY_PREVIEW_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
