/*!
Serveur HTTP stub pour `/api/info`

Petit serveur axum sur 127.0.0.1 (port éphémère) qui rejoue des réponses
scriptées, pour tester `HttpInfoSource` et le loader de bout en bout.
Option: exiger les headers `X-KVMD-User` / `X-KVMD-Passwd` (401 sinon).
*/

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::scripted_source::info_body;

#[derive(Clone, Default)]
struct StubState {
    replies: Arc<Mutex<VecDeque<(u16, String)>>>,
    fallback: Arc<Mutex<(u16, String)>>,
    credentials: Arc<Mutex<Option<(String, String)>>>,
    hits: Arc<Mutex<Vec<HeaderMap>>>,
}

pub struct StubInfoServer {
    addr: SocketAddr,
    state: StubState,
    handle: JoinHandle<()>,
}

impl StubInfoServer {
    /// Démarre le serveur; par défaut il répond 200 avec le port 623
    pub async fn start() -> anyhow::Result<Self> {
        let state = StubState::default();
        *state.fallback.lock() = (200, info_body(623));

        let app = Router::new()
            .route("/api/info", get(info))
            .with_state(state.clone());

        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::warn!("stub server stopped: {}", e);
            }
        });
        log::info!("🧪 stub /api/info on http://{}", addr);

        Ok(Self { addr, state, handle })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Réponse jouée une fois, avant la réponse par défaut
    pub fn push_reply(&self, status: u16, body: impl Into<String>) {
        self.state.replies.lock().push_back((status, body.into()));
    }

    /// Réponse rendue quand la file est vide
    pub fn set_fallback(&self, status: u16, body: impl Into<String>) {
        *self.state.fallback.lock() = (status, body.into());
    }

    pub fn require_credentials(&self, user: &str, passwd: &str) {
        *self.state.credentials.lock() = Some((user.to_string(), passwd.to_string()));
    }

    pub fn hits(&self) -> usize {
        self.state.hits.lock().len()
    }

    /// Headers de chaque requête reçue
    pub fn request_headers(&self) -> Vec<HeaderMap> {
        self.state.hits.lock().clone()
    }
}

impl Drop for StubInfoServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn info(State(state): State<StubState>, headers: HeaderMap) -> (StatusCode, String) {
    state.hits.lock().push(headers.clone());

    if let Some((user, passwd)) = state.credentials.lock().clone() {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
        if header("x-kvmd-user").as_deref() != Some(user.as_str())
            || header("x-kvmd-passwd").as_deref() != Some(passwd.as_str())
        {
            return (StatusCode::UNAUTHORIZED, "unauthorized".to_string());
        }
    }

    let next = state.replies.lock().pop_front();
    let (status, body) = next.unwrap_or_else(|| state.fallback.lock().clone());
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        body,
    )
}
