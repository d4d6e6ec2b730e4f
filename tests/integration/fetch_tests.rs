//! Page fetching against a mock listing site

use ad_watcher::config::HttpConfig;
use ad_watcher::page::{FetchError, HttpFetcher, PageFetcher};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(timeout: Duration) -> HttpFetcher {
    let http = HttpConfig {
        user_agent: "TestAgent/1.0".to_string(),
        accept_language: "pt-BR".to_string(),
    };
    HttpFetcher::from_config(&http, timeout).expect("Failed to build fetcher")
}

#[tokio::test]
async fn test_fetch_sends_browser_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("user-agent", "TestAgent/1.0"))
        .and(header("accept-language", "pt-BR"))
        .and(header("x-nextjs-data", "1"))
        .and(header("sec-fetch-mode", "cors"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = fetcher(Duration::from_secs(5))
        .fetch(&format!("{}/search", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let url = format!("{}/search", mock_server.uri());
    let error = fetcher(Duration::from_secs(5)).fetch(&url).await.unwrap_err();

    match error {
        FetchError::Status { url: failed, status } => {
            assert_eq!(status, 503);
            assert_eq!(failed, url);
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_empty_body_is_ok() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let body = fetcher(Duration::from_secs(5))
        .fetch(&format!("{}/empty", mock_server.uri()))
        .await
        .unwrap();

    assert!(body.is_empty());
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let error = fetcher(Duration::from_millis(200))
        .fetch(&format!("{}/slow", mock_server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(error, FetchError::Timeout { .. }));
}
