/*!
Source `/api/info` scriptée

Rejoue une suite de réponses (ou d'erreurs de transport) puis répond 503
indéfiniment. Horodate chaque requête avec l'horloge tokio, ce qui permet
de vérifier l'espacement des retries en temps virtuel (`start_paused`).
*/

use async_trait::async_trait;
use ipmi_panel::{InfoReply, InfoSource, PanelError};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::time::Instant;

#[derive(Debug, Clone)]
enum Step {
    Reply(InfoReply),
    TransportError(String),
}

#[derive(Clone, Default)]
pub struct ScriptedSource {
    steps: Arc<Mutex<VecDeque<Step>>>,
    requests: Arc<Mutex<Vec<Instant>>>,
}

/// Corps `/api/info` minimal portant le port IPMI
pub fn info_body(port: u16) -> String {
    json!({
        "ok": true,
        "result": {
            "extras": { "ipmi": { "daemon": "kvmd-ipmi", "port": port, "enabled": true } },
            "system": { "kvmd": { "version": "devkit" } },
        }
    })
    .to_string()
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: impl Into<String>) -> Self {
        self.steps.lock().push_back(Step::Reply(InfoReply::new(status, body)));
        self
    }

    pub fn ok(self, port: u16) -> Self {
        self.reply(200, info_body(port))
    }

    /// `count` réponses identiques
    pub fn repeat(self, count: usize, status: u16, body: &str) -> Self {
        for _ in 0..count {
            self.steps.lock().push_back(Step::Reply(InfoReply::new(status, body)));
        }
        self
    }

    pub fn transport_error(self, message: &str) -> Self {
        self.steps.lock().push_back(Step::TransportError(message.to_string()));
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Instants (horloge tokio) de chaque requête reçue
    pub fn request_times(&self) -> Vec<Instant> {
        self.requests.lock().clone()
    }

    pub fn remaining(&self) -> usize {
        self.steps.lock().len()
    }
}

#[async_trait]
impl InfoSource for ScriptedSource {
    async fn fetch_info(&self) -> ipmi_panel::Result<InfoReply> {
        self.requests.lock().push(Instant::now());
        let step = self.steps.lock().pop_front();
        match step {
            Some(Step::Reply(reply)) => {
                log::debug!("📨 [SCRIPT] status {}", reply.status);
                Ok(reply)
            }
            Some(Step::TransportError(message)) => {
                log::debug!("💥 [SCRIPT] transport error: {}", message);
                Err(PanelError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    message,
                )))
            }
            None => Ok(InfoReply::new(503, "")),
        }
    }
}
