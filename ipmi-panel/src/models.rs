use reqwest::Url;
use serde::Deserialize;

use crate::error::{PanelError, Result};

/// Body of `GET /api/info`. Only `result.extras.ipmi.port` is read,
/// everything else in the document is ignored.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub result: InfoResult,
}

#[derive(Debug, Deserialize)]
pub struct InfoResult {
    pub extras: Extras,
}

#[derive(Debug, Deserialize)]
pub struct Extras {
    pub ipmi: IpmiExtra,
}

#[derive(Debug, Deserialize)]
pub struct IpmiExtra {
    pub port: u16,
}

impl StatusResponse {
    /// Extrait le port IPMI du corps JSON.
    pub fn parse(body: &str) -> Result<u16> {
        serde_json::from_str::<StatusResponse>(body)
            .map(|resp| resp.result.extras.ipmi.port)
            .map_err(|e| PanelError::MalformedResponse(e.to_string()))
    }
}

/// A completed HTTP exchange, independent of the transport that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoReply {
    pub status: u16,
    pub body: String,
}

impl InfoReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }
}

/// Location of the hosting page, with browser semantics:
/// `protocol` keeps its trailing colon and `host` only carries a port
/// when it is not the scheme default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    pub protocol: String,
    pub hostname: String,
    pub host: String,
}

impl PageLocation {
    pub fn new(protocol: impl Into<String>, hostname: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            hostname: hostname.into(),
            host: host.into(),
        }
    }

    pub fn from_url(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| PanelError::InvalidUrl {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid("scheme must be http or https"));
        }
        let hostname = url.host_str().ok_or_else(|| invalid("missing host"))?.to_string();
        let host = match url.port() {
            Some(port) => format!("{hostname}:{port}"),
            None => hostname.clone(),
        };

        Ok(Self {
            protocol: format!("{}:", url.scheme()),
            hostname,
            host,
        })
    }

    /// `protocol//host`, i.e. the page origin.
    pub fn origin(&self) -> String {
        format!("{}//{}", self.protocol, self.host)
    }
}
