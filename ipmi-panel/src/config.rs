//! Configuration management
//!
//! Handles:
//! - KVMD endpoint (base URL, TLS verification, header credentials)
//! - Retry delay and request timeout
//! - Target element and login path
//!
//! Lookup order: TOML file (`IPMI_PANEL_CONFIG` or `ipmi-panel.toml`),
//! then `IPMI_PANEL_*` environment overrides, then command-line flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::error::{PanelError, Result};

pub const CONFIG_ENV: &str = "IPMI_PANEL_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "ipmi-panel.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub base_url: String,
    pub insecure: bool,
    pub retry_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub element_id: String,
    pub login_path: String,
    pub auth: Option<AuthConfig>,
}

/// Values given on the command line; `None` keeps what file and env produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub insecure: Option<bool>,
    pub retry_delay_ms: Option<u64>,
}

/// Credentials sent as `X-KVMD-User` / `X-KVMD-Passwd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub user: String,
    #[serde(default)]
    pub passwd: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost".to_string(),
            insecure: false,
            retry_delay_ms: 1000,
            request_timeout_secs: 10,
            element_id: "ipmi-text".to_string(),
            login_path: "/login".to_string(),
            auth: None,
        }
    }
}

impl PanelConfig {
    /// Resolve the config file path from the environment.
    pub fn config_file_path() -> PathBuf {
        std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load from `path`. A missing or empty file yields the defaults.
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let txt = tokio::fs::read_to_string(path).await?;
        if txt.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::from_toml(&txt)
    }

    pub fn from_toml(txt: &str) -> Result<Self> {
        let config: PanelConfig = toml::from_str(txt).map_err(|e| PanelError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `IPMI_PANEL_URL`, `IPMI_PANEL_USER` and `IPMI_PANEL_PASSWD`.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("IPMI_PANEL_URL") {
            self.base_url = url;
        }
        if let Some(user) = lookup("IPMI_PANEL_USER") {
            let passwd = lookup("IPMI_PANEL_PASSWD")
                .or_else(|| self.auth.as_ref().map(|a| a.passwd.clone()))
                .unwrap_or_default();
            self.auth = Some(AuthConfig { user, passwd });
        } else if let (Some(passwd), Some(auth)) = (lookup("IPMI_PANEL_PASSWD"), self.auth.as_mut()) {
            auth.passwd = passwd;
        }
    }

    pub fn apply_cli(&mut self, overrides: &CliOverrides) {
        if let Some(url) = &overrides.base_url {
            self.base_url = url.clone();
        }
        if let Some(insecure) = overrides.insecure {
            self.insecure = insecure;
        }
        if let Some(ms) = overrides.retry_delay_ms {
            self.retry_delay_ms = ms;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(PanelError::Config("base_url must not be empty".into()));
        }
        if self.element_id.trim().is_empty() {
            return Err(PanelError::Config("element_id must not be empty".into()));
        }
        if !self.login_path.starts_with('/') {
            return Err(PanelError::Config("login_path must be an absolute path".into()));
        }
        if self.retry_delay_ms == 0 {
            return Err(PanelError::Config("retry_delay_ms must be positive".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(PanelError::Config("request_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
