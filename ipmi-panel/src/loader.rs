//! InfoPanelLoader: fetch `/api/info`, render the IPMI help block, retry forever.
//!
//! Cycle: one request in flight, then either a terminal effect (DOM write or
//! navigation) or one pending sleep before the next request. Retries are a
//! loop, so a long outage does not grow the stack.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::PanelConfig;
use crate::error::Result;
use crate::models::StatusResponse;
use crate::page::Page;
use crate::render::{render_ipmi_help, RenderContext};
use crate::source::InfoSource;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_ELEMENT_ID: &str = "ipmi-text";
pub const DEFAULT_LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Awaiting,
    Rendered,
    Redirecting,
}

/// Terminal result of `load()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered,
    Redirected,
}

pub struct InfoPanelLoader<S, P> {
    source: S,
    page: P,
    state: LoaderState,
    attempts: u64,
    retry_delay: Duration,
    element_id: String,
    login_path: String,
}

impl<S: InfoSource, P: Page> InfoPanelLoader<S, P> {
    pub fn new(source: S, page: P) -> Self {
        Self {
            source,
            page,
            state: LoaderState::Idle,
            attempts: 0,
            retry_delay: DEFAULT_RETRY_DELAY,
            element_id: DEFAULT_ELEMENT_ID.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }

    pub fn from_config(source: S, page: P, config: &PanelConfig) -> Self {
        Self::new(source, page)
            .with_retry_delay(config.retry_delay())
            .with_element_id(&config.element_id)
            .with_login_path(&config.login_path)
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_element_id(mut self, element_id: &str) -> Self {
        self.element_id = element_id.to_string();
        self
    }

    pub fn with_login_path(mut self, login_path: &str) -> Self {
        self.login_path = login_path.to_string();
        self
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// Requests issued so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn into_page(self) -> P {
        self.page
    }

    /// Run until the panel is rendered or the page is sent to the login path.
    ///
    /// Transport failures, unexpected statuses and unparseable bodies are all
    /// retried after the fixed delay. Only a failing page write is returned as
    /// an error. Calling it again on a finished loader returns the same
    /// outcome without a new request.
    pub async fn load(&mut self) -> Result<LoadOutcome> {
        match self.state {
            LoaderState::Rendered => return Ok(LoadOutcome::Rendered),
            LoaderState::Redirecting => return Ok(LoadOutcome::Redirected),
            LoaderState::Idle | LoaderState::Awaiting => {}
        }

        self.state = LoaderState::Awaiting;
        loop {
            if let Some(outcome) = self.attempt().await? {
                return Ok(outcome);
            }
            debug!("retrying /api/info in {:?}", self.retry_delay);
            tokio::time::sleep(self.retry_delay).await;
        }
    }

    /// One request/response cycle. `None` means "try again later".
    async fn attempt(&mut self) -> Result<Option<LoadOutcome>> {
        self.attempts = self.attempts.saturating_add(1);
        let attempt = self.attempts;

        let reply = match self.source.fetch_info().await {
            Ok(reply) => reply,
            Err(e) => {
                debug!(attempt, "request failed: {}", e);
                return Ok(None);
            }
        };

        match reply.status {
            200 => {
                let port = match StatusResponse::parse(&reply.body) {
                    Ok(port) => port,
                    Err(e) => {
                        warn!(attempt, "ignoring unusable /api/info body: {}", e);
                        return Ok(None);
                    }
                };

                let ctx = RenderContext::new(&self.page.location(), port);
                let markup = render_ipmi_help(&ctx);
                self.page.set_inner_html(&self.element_id, &markup)?;
                self.state = LoaderState::Rendered;
                info!(attempt, host = %ctx.host, port, "IPMI panel rendered");
                Ok(Some(LoadOutcome::Rendered))
            }
            401 | 403 => {
                self.page.navigate(&self.login_path)?;
                self.state = LoaderState::Redirecting;
                info!(attempt, status = reply.status, "not authorized, going to {}", self.login_path);
                Ok(Some(LoadOutcome::Redirected))
            }
            status => {
                debug!(attempt, status, "unexpected status");
                Ok(None)
            }
        }
    }
}
