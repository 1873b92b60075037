//! Where the loader gets `/api/info` from.

use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

use crate::config::{AuthConfig, PanelConfig};
use crate::error::{PanelError, Result};
use crate::models::InfoReply;

pub const INFO_PATH: &str = "/api/info";

/// One GET of the status document.
///
/// Any completed exchange is `Ok`, whatever its status code; `Err` means the
/// request never completed (connection refused, timeout, TLS...).
#[async_trait]
pub trait InfoSource: Send + Sync {
    async fn fetch_info(&self) -> Result<InfoReply>;
}

/// reqwest-backed source talking to a KVMD instance.
#[derive(Clone)]
pub struct HttpInfoSource {
    client: reqwest::Client,
    url: Url,
    auth: Option<AuthConfig>,
}

impl HttpInfoSource {
    pub fn new(base_url: &str, insecure: bool, timeout: Duration, auth: Option<AuthConfig>) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| PanelError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        // chemin absolu: même origine que la page, quel que soit le chemin de base
        let url = base.join(INFO_PATH).map_err(|e| PanelError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .timeout(timeout)
            .user_agent(concat!("ipmi-panel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, url, auth })
    }

    pub fn from_config(config: &PanelConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            config.insecure,
            config.request_timeout(),
            config.auth.clone(),
        )
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl InfoSource for HttpInfoSource {
    async fn fetch_info(&self) -> Result<InfoReply> {
        let mut request = self.client.get(self.url.clone());
        if let Some(auth) = &self.auth {
            request = request
                .header("X-KVMD-User", &auth.user)
                .header("X-KVMD-Passwd", &auth.passwd);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "GET {} completed", self.url);

        Ok(InfoReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_url_is_origin_relative() {
        let source = HttpInfoSource::new("https://kvm.local/kvm/ipmi", true, Duration::from_secs(5), None).unwrap();
        assert_eq!(source.url().as_str(), "https://kvm.local/api/info");

        let source = HttpInfoSource::from_config(&PanelConfig {
            base_url: "http://127.0.0.1:8080".into(),
            ..PanelConfig::default()
        })
        .unwrap();
        assert_eq!(source.url().as_str(), "http://127.0.0.1:8080/api/info");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = HttpInfoSource::new("not a url", true, Duration::from_secs(5), None).err().unwrap();
        assert!(matches!(err, PanelError::InvalidUrl { .. }));
    }
}
