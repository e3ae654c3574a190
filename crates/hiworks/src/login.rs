//! Two-step login flow.
//!
//! The portal asks for the username first and the password on a second page.
//! Element identifiers on both pages are unstable, so every required element
//! is located through an ordered chain of selector strategies in descending
//! order of specificity.

use crate::browser::{find_first, find_required, BrowserElement, BrowserSession, Locator};
use crate::config::ScraperConfig;
use crate::credentials::Credentials;
use crate::error::ScrapeError;
use tracing::{info, warn};

/// Title substrings that veto a login-success verdict.
const FAILURE_MARKERS: [&str; 3] = ["error", "fail", "invalid"];

/// Progress of one login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    NotStarted,
    UsernameEntered,
    PasswordSubmitted,
    Authenticated,
    Failed,
}

fn username_input_chain() -> Vec<Locator> {
    vec![
        Locator::css("[id^='mantine-']"),
        Locator::css("input[type='text'], input[type='email']"),
        Locator::xpath(
            "//input[@placeholder and (contains(@placeholder, '아이디') \
             or contains(@placeholder, 'ID') \
             or contains(@placeholder, '이메일') \
             or contains(@placeholder, 'email'))]",
        ),
    ]
}

fn username_submit_chain() -> Vec<Locator> {
    vec![
        Locator::xpath("//button[@type='submit']"),
        Locator::xpath("//button[contains(text(), '다음')]"),
        Locator::xpath("//button[contains(text(), '계속')]"),
        Locator::xpath("//button[contains(text(), '확인')]"),
        Locator::xpath("//button[contains(text(), '진행')]"),
        Locator::css("button[type='submit']"),
    ]
}

fn password_input_chain() -> Vec<Locator> {
    vec![
        Locator::name("password"),
        Locator::xpath("//input[@type='password']"),
        Locator::css("input[type='password']"),
        Locator::xpath("//input[@placeholder and contains(@placeholder, '비밀번호')]"),
    ]
}

fn login_submit_chain() -> Vec<Locator> {
    vec![
        Locator::xpath("//button[@type='submit']"),
        Locator::xpath("//button[contains(text(), '로그인')]"),
        Locator::xpath("//button[contains(text(), '확인')]"),
        Locator::xpath("//button[contains(text(), '완료')]"),
        Locator::css("button[type='submit']"),
    ]
}

/// Judges the post-submission page: success requires the URL to have left
/// the login flow AND the title to carry no failure marker. Any single
/// failing indicator flips the verdict.
pub fn judge_login_success(url: &str, title: &str) -> bool {
    let url_left_login = !url.to_lowercase().contains("login");
    let title_lower = title.to_lowercase();
    let title_clean = FAILURE_MARKERS.iter().all(|m| !title_lower.contains(m));
    url_left_login && title_clean
}

/// Drives one login attempt against a browser session.
///
/// No retry happens inside the flow; exhausting a selector chain or a failed
/// verdict ends the attempt and retrying is the caller's decision.
pub struct LoginFlow<'a, B> {
    browser: &'a B,
    config: &'a ScraperConfig,
    state: LoginState,
    tenant_id: Option<String>,
}

impl<'a, B: BrowserSession> LoginFlow<'a, B> {
    pub fn new(browser: &'a B, config: &'a ScraperConfig) -> Self {
        Self {
            browser,
            config,
            state: LoginState::NotStarted,
            tenant_id: None,
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    /// Tenant id captured from the URL after the username step, if any.
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Runs the full flow. On `Ok(())` the state is `Authenticated`; any
    /// error leaves the state at `Failed`.
    pub async fn run(&mut self, credentials: &Credentials) -> Result<(), ScrapeError> {
        let result = self.run_inner(credentials).await;
        if result.is_err() {
            self.state = LoginState::Failed;
        }
        result
    }

    async fn run_inner(&mut self, credentials: &Credentials) -> Result<(), ScrapeError> {
        info!(url = %self.config.login_url, "starting two-step login");
        self.browser.goto(&self.config.login_url).await?;
        tokio::time::sleep(self.config.settle_delay()).await;

        self.submit_username(&credentials.username).await?;
        self.state = LoginState::UsernameEntered;

        // The portal reveals the tenant segment in the URL once the
        // username is accepted.
        let url = self.browser.current_url().await?;
        self.tenant_id = crate::bridge::tenant_from_url(&url);
        match &self.tenant_id {
            Some(tenant) => info!(%tenant, "resolved tenant id from login URL"),
            None => warn!(%url, "could not resolve tenant id from login URL"),
        }

        self.submit_password(&credentials.password).await?;
        self.state = LoginState::PasswordSubmitted;

        tokio::time::sleep(self.config.settle_delay()).await;
        let url = self.browser.current_url().await?;
        let title = self.browser.title().await?;
        info!(%url, %title, "judging login outcome");

        if judge_login_success(&url, &title) {
            self.state = LoginState::Authenticated;
            info!("login succeeded");
            Ok(())
        } else {
            Err(ScrapeError::AuthenticationFailed {
                reason: format!("post-login page rejected (url: {url}, title: {title})"),
            })
        }
    }

    async fn submit_username(&self, username: &str) -> Result<(), ScrapeError> {
        let wait = self.config.wait_timeout();
        let input = find_required(
            self.browser,
            &username_input_chain(),
            wait,
            "username input field",
        )
        .await?;
        input.clear().await?;
        input.type_text(username).await?;
        info!("username entered");

        match find_first(self.browser, &username_submit_chain(), wait).await? {
            Some((_, button)) => {
                button.click().await?;
                info!("username submit button clicked");
            }
            None => {
                warn!("no username submit button found, submitting form directly");
                input.submit_form().await?;
            }
        }

        tokio::time::sleep(self.config.transition_delay()).await;
        Ok(())
    }

    async fn submit_password(&self, password: &str) -> Result<(), ScrapeError> {
        let wait = self.config.wait_timeout();
        let input = find_required(
            self.browser,
            &password_input_chain(),
            wait,
            "password input field",
        )
        .await?;
        input.clear().await?;
        input.type_text(password).await?;
        info!("password entered");

        match find_first(self.browser, &login_submit_chain(), wait).await? {
            Some((_, button)) => {
                button.click().await?;
                info!("login button clicked");
            }
            None => {
                warn!("no login button found, submitting form directly");
                input.submit_form().await?;
            }
        }
        Ok(())
    }
}
