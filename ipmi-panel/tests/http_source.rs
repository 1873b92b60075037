//! End-to-end: reqwest source against a stub /api/info server.

use ipmi_panel::{
    AuthConfig, HttpInfoSource, InfoPanelLoader, InfoSource, LoadOutcome, Output, PageLocation, TerminalPage,
};
use panel_devkit::{MockPage, StubInfoServer};
use std::time::Duration;

const FAST_RETRY: Duration = Duration::from_millis(20);

fn source_for(server: &StubInfoServer, auth: Option<AuthConfig>) -> HttpInfoSource {
    HttpInfoSource::new(&server.base_url(), false, Duration::from_secs(5), auth).unwrap()
}

#[tokio::test]
async fn test_fetches_and_renders() {
    let server = StubInfoServer::start().await.unwrap();
    let page = MockPage::at(&server.base_url()).unwrap();
    let mut loader = InfoPanelLoader::new(source_for(&server, None), page.clone());

    assert_eq!(loader.load().await.unwrap(), LoadOutcome::Rendered);

    let html = &page.writes_to("ipmi-text")[0];
    assert!(html.contains("-H 127.0.0.1 -p 623 power on"));
    assert!(html.contains(&format!("{}/api/atx/power?action=on", server.base_url())));
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_retries_after_server_error() {
    let server = StubInfoServer::start().await.unwrap();
    server.push_reply(500, "internal error");
    server.push_reply(503, "starting");

    let page = MockPage::at(&server.base_url()).unwrap();
    let mut loader = InfoPanelLoader::new(source_for(&server, None), page.clone()).with_retry_delay(FAST_RETRY);

    assert_eq!(loader.load().await.unwrap(), LoadOutcome::Rendered);
    assert_eq!(server.hits(), 3);
    assert_eq!(page.writes_to("ipmi-text").len(), 1);
}

#[tokio::test]
async fn test_missing_credentials_redirect_to_login() {
    let server = StubInfoServer::start().await.unwrap();
    server.require_credentials("admin", "admin");

    let page = MockPage::at(&server.base_url()).unwrap();
    let mut loader = InfoPanelLoader::new(source_for(&server, None), page.clone());

    assert_eq!(loader.load().await.unwrap(), LoadOutcome::Redirected);
    assert_eq!(page.navigations(), vec!["/login"]);
    assert!(page.writes_to("ipmi-text").is_empty());
}

#[tokio::test]
async fn test_sends_kvmd_headers() {
    let server = StubInfoServer::start().await.unwrap();
    server.require_credentials("admin", "s3cret");
    let auth = AuthConfig { user: "admin".into(), passwd: "s3cret".into() };

    let reply = source_for(&server, Some(auth)).fetch_info().await.unwrap();
    assert_eq!(reply.status, 200);

    let headers = &server.request_headers()[0];
    assert_eq!(headers.get("x-kvmd-user").unwrap(), "admin");
    assert_eq!(headers.get("x-kvmd-passwd").unwrap(), "s3cret");
}

#[tokio::test]
async fn test_unreachable_daemon_is_retried_silently() {
    // port libéré juste après bind: connexion refusée
    let addr = {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        listener.local_addr().unwrap()
    };
    let base = format!("http://{addr}");
    let source = HttpInfoSource::new(&base, false, Duration::from_secs(1), None).unwrap();
    assert!(source.fetch_info().await.is_err());

    let page = MockPage::at(&base).unwrap();
    let mut loader = InfoPanelLoader::new(source, page.clone()).with_retry_delay(FAST_RETRY);
    let result = tokio::time::timeout(Duration::from_millis(200), loader.load()).await;

    assert!(result.is_err());
    assert!(loader.attempts() >= 2);
    assert!(page.is_untouched());
}

#[tokio::test]
async fn test_terminal_page_writes_file() {
    let server = StubInfoServer::start().await.unwrap();
    server.set_fallback(200, panel_devkit::info_body(10623));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("panel.html");
    let location = PageLocation::from_url(&server.base_url()).unwrap();
    let page = TerminalPage::new(location, Output::File(path.clone()));
    let mut loader = InfoPanelLoader::new(source_for(&server, None), page);

    loader.load().await.unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("<div id=\"ipmi-text\">\n"));
    assert!(written.contains("-p 10623 power status"));
    assert!(loader.page().redirect().is_none());
}
