use chatline::config::Config;
use chatline::gateway::run_gateway_with_listener;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"<!doctype html>
<html>
  <head>
    <title>Fallback Title</title>
    <meta property="og:title" content="T">
    <meta name="twitter:description" content="A short summary">
    <meta property="og:image" content="/img.png">
  </head>
  <body><p>Article body</p></body>
</html>"#;

struct GatewayTestServer {
    port: u16,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl GatewayTestServer {
    async fn start(config: Config) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let host = "127.0.0.1".to_string();
        let handle =
            tokio::spawn(async move { run_gateway_with_listener(&host, listener, config).await });

        wait_until_gateway_ready(port).await;

        Self { port, handle }
    }

    async fn with_loopback_upstreams() -> Self {
        let mut config = Config::default();
        config.preview.block_private_hosts = false;
        Self::start(config).await
    }

    async fn preview(&self, target: &str) -> (StatusCode, Value) {
        let response = reqwest::Client::new()
            .get(format!("http://127.0.0.1:{}/api/preview", self.port))
            .query(&[("url", target)])
            .send()
            .await
            .expect("preview request should reach gateway");
        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .expect("preview response should be JSON");
        (status, body)
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await
            .is_ok()
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("gateway did not become ready on port {port}");
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

#[tokio::test]
async fn html_page_yields_metadata_with_absolute_image() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html(ARTICLE))
        .mount(&upstream)
        .await;
    let gateway = GatewayTestServer::with_loopback_upstreams().await;

    let (status, body) = gateway.preview(&format!("{}/page", upstream.uri())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "T");
    assert_eq!(body["description"], "A short summary");
    assert_eq!(body["image"], format!("{}/img.png", upstream.uri()));
}

#[tokio::test]
async fn page_without_meta_tags_falls_back_to_title_element() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(html("<html><head><title>Page</title></head><body></body></html>"))
        .mount(&upstream)
        .await;
    let gateway = GatewayTestServer::with_loopback_upstreams().await;

    let (status, body) = gateway.preview(&format!("{}/plain", upstream.uri())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({"title": "Page", "description": null, "image": null})
    );
}

#[tokio::test]
async fn outbound_fetch_sends_fixed_browser_headers() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/headers"))
        .respond_with(html(ARTICLE))
        .expect(1)
        .mount(&upstream)
        .await;
    let gateway = GatewayTestServer::with_loopback_upstreams().await;

    let (status, _) = gateway.preview(&format!("{}/headers", upstream.uri())).await;
    assert_eq!(status, StatusCode::OK);

    let received = upstream
        .received_requests()
        .await
        .expect("mock server should record received requests");
    assert_eq!(received.len(), 1);
    let defaults = Config::default().preview;
    let sent = |name: &str| {
        received[0]
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    assert_eq!(sent("user-agent"), Some(defaults.user_agent));
    assert_eq!(sent("accept"), Some(defaults.accept));
    assert_eq!(sent("accept-language"), Some(defaults.accept_language));
}

#[tokio::test]
async fn non_html_content_returns_placeholder() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(&upstream)
        .await;
    let gateway = GatewayTestServer::with_loopback_upstreams().await;
    let target = format!("{}/report.pdf", upstream.uri());

    let (status, body) = gateway.preview(&target).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], target.as_str());
    assert_eq!(body["description"], "This URL does not contain HTML content.");
    assert!(body["image"].is_null());
}

#[tokio::test]
async fn cached_non_html_placeholder_echoes_each_requested_url() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&upstream)
        .await;
    let gateway = GatewayTestServer::with_loopback_upstreams().await;
    let first_target = format!("{}/report.pdf", upstream.uri());
    let second_target = format!("{}/./report.pdf", upstream.uri());

    let (_, first) = gateway.preview(&first_target).await;
    let (status, second) = gateway.preview(&second_target).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["title"], first_target.as_str());
    assert_eq!(second["title"], second_target.as_str());
    upstream.verify().await;
}

#[tokio::test]
async fn malformed_url_is_rejected_with_400() {
    let gateway = GatewayTestServer::with_loopback_upstreams().await;

    for target in ["not a url", "/relative", "ftp://files.example.com/x"] {
        let (status, body) = gateway.preview(target).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{target}");
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    }
}

#[tokio::test]
async fn missing_url_parameter_is_rejected_with_400() {
    let gateway = GatewayTestServer::with_loopback_upstreams().await;

    let response = reqwest::Client::new()
        .get(format!("http://127.0.0.1:{}/api/preview", gateway.port))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("url"));
}

#[tokio::test]
async fn upstream_error_status_is_reported_as_400() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&upstream)
        .await;
    let gateway = GatewayTestServer::with_loopback_upstreams().await;

    let (status, body) = gateway.preview(&format!("{}/gone", upstream.uri())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn unreachable_upstream_is_reported_as_400() {
    let gateway = GatewayTestServer::with_loopback_upstreams().await;
    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let (status, body) = gateway.preview(&format!("http://127.0.0.1:{closed}/")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Failed to fetch URL"));
}

#[tokio::test]
async fn slow_upstream_times_out_with_400() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html(ARTICLE).set_delay(Duration::from_secs(3)))
        .mount(&upstream)
        .await;
    let mut config = Config::default();
    config.preview.block_private_hosts = false;
    config.preview.timeout_secs = 1;
    let gateway = GatewayTestServer::start(config).await;

    let (status, body) = gateway.preview(&format!("{}/slow", upstream.uri())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

/// Known-surprising: the bot check looks at the agent reported by the
/// upstream *response*, not at the client calling the gateway.
#[tokio::test]
async fn bot_agent_on_upstream_response_is_rejected_with_403() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/guarded"))
        .respond_with(html(ARTICLE).insert_header("user-agent", "Googlebot/2.1"))
        .mount(&upstream)
        .await;
    let gateway = GatewayTestServer::with_loopback_upstreams().await;

    let (status, body) = gateway.preview(&format!("{}/guarded", upstream.uri())).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied by bot protection");
}

#[tokio::test]
async fn bot_calling_gateway_is_not_rejected() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html(ARTICLE))
        .mount(&upstream)
        .await;
    let gateway = GatewayTestServer::with_loopback_upstreams().await;

    let response = reqwest::Client::new()
        .get(format!("http://127.0.0.1:{}/api/preview", gateway.port))
        .query(&[("url", format!("{}/page", upstream.uri()))])
        .header("user-agent", "Googlebot/2.1")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn repeated_preview_is_served_from_cache() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cached"))
        .respond_with(html(ARTICLE))
        .expect(1)
        .mount(&upstream)
        .await;
    let gateway = GatewayTestServer::with_loopback_upstreams().await;
    let target = format!("{}/cached", upstream.uri());

    let (first_status, first) = gateway.preview(&target).await;
    let (second_status, second) = gateway.preview(&target).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first, second);
    upstream.verify().await;
}

#[tokio::test]
async fn failed_previews_are_not_cached() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&upstream)
        .await;
    let gateway = GatewayTestServer::with_loopback_upstreams().await;
    let target = format!("{}/flaky", upstream.uri());

    assert_eq!(gateway.preview(&target).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(gateway.preview(&target).await.0, StatusCode::BAD_REQUEST);
    upstream.verify().await;
}

#[tokio::test]
async fn loopback_targets_are_blocked_by_default() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(ARTICLE))
        .expect(0)
        .mount(&upstream)
        .await;
    let gateway = GatewayTestServer::start(Config::default()).await;

    let (status, body) = gateway.preview(&format!("{}/page", upstream.uri())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("private"));
    upstream.verify().await;
}
