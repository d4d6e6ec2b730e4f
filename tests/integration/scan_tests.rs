//! End-to-end scans: listing page, detail pages, dedup

use crate::{ad_record, detail_page, search_page};
use ad_watcher::config::HttpConfig;
use ad_watcher::page::{FetchError, HttpFetcher};
use ad_watcher::watcher::ScanFailure;
use ad_watcher::{ScanOutcome, Watcher};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn watcher(mock_server: &MockServer) -> Watcher {
    let fetcher = HttpFetcher::from_config(&HttpConfig::default(), Duration::from_secs(5))
        .expect("Failed to build fetcher");
    Watcher::new(format!("{}/search", mock_server.uri()), Arc::new(fetcher))
}

async fn mount_search(mock_server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(mock_server)
        .await;
}

async fn mount_detail(
    mock_server: &MockServer,
    id: u32,
    description: &str,
    expected_calls: u64,
) {
    let ad = json!({
        "description": description,
        "phone": {"phone": "41999990000"},
        "location": {"zipcode": "80000000"},
        "locationProperties": [
            {"label": "CEP", "value": "80010-000"},
            {"label": "Município", "value": "Curitiba"},
            {"label": "Bairro", "value": "Centro"}
        ],
        "properties": [
            {"name": "rooms", "value": "2"},
            {"name": "iptu", "value": 120}
        ]
    });
    Mock::given(method("GET"))
        .and(path(format!("/ad/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(ad)))
        .expect(expected_calls)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_scan_enriches_new_listings() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_search(
        &mock_server,
        search_page(&[ad_record(&base, 1, "R$ 1.200"), ad_record(&base, 2, "R$ 900")]),
    )
    .await;
    mount_detail(&mock_server, 1, "Sunny, two bedrooms", 1).await;
    mount_detail(&mock_server, 2, "Close to the park", 1).await;

    let mut watcher = watcher(&mock_server);
    let listings = watcher.scan().await;

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].title, "Apartment 1");
    assert_eq!(listings[0].price.as_deref(), Some("1.200"));
    assert_eq!(listings[0].description, "Sunny, two bedrooms");
    assert_eq!(listings[0].postal_code, "80010-000");
    assert_eq!(listings[0].municipality, "Curitiba");
    assert_eq!(listings[0].district, "Centro");
    assert_eq!(listings[0].phone.as_deref(), Some("41999990000"));
    assert_eq!(listings[0].rooms.as_deref(), Some("2"));
    assert_eq!(listings[0].property_tax.as_deref(), Some("120"));
    assert_eq!(listings[1].description, "Close to the park");
    assert_eq!(watcher.seen_count(), 2);
}

#[tokio::test]
async fn test_unchanged_page_skips_detail_requests() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_search(&mock_server, search_page(&[ad_record(&base, 1, "R$ 500")])).await;
    // Only the first scan may reach the detail page
    mount_detail(&mock_server, 1, "Studio", 1).await;

    let mut watcher = watcher(&mock_server);
    assert_eq!(watcher.scan().await.len(), 1);
    assert!(matches!(watcher.poll().await, ScanOutcome::Unchanged));
    assert!(watcher.scan().await.is_empty());
}

#[tokio::test]
async fn test_only_unseen_listings_are_returned() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_search(&mock_server, search_page(&[ad_record(&base, 1, "R$ 500")])).await;
    mount_detail(&mock_server, 1, "Studio", 1).await;

    let mut watcher = watcher(&mock_server);
    assert_eq!(watcher.scan().await.len(), 1);

    mock_server.reset().await;
    mount_search(
        &mock_server,
        search_page(&[ad_record(&base, 3, "R$ 700"), ad_record(&base, 1, "R$ 500")]),
    )
    .await;
    mount_detail(&mock_server, 1, "Studio", 0).await;
    mount_detail(&mock_server, 3, "Loft", 1).await;

    let listings = watcher.scan().await;
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].title, "Apartment 3");
    assert_eq!(listings[0].description, "Loft");
}

#[tokio::test]
async fn test_price_change_is_reported_again() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_search(&mock_server, search_page(&[ad_record(&base, 1, "R$ 500")])).await;
    mount_detail(&mock_server, 1, "Studio", 1).await;

    let mut watcher = watcher(&mock_server);
    assert_eq!(watcher.scan().await.len(), 1);

    mock_server.reset().await;
    mount_search(&mock_server, search_page(&[ad_record(&base, 1, "R$ 450")])).await;
    mount_detail(&mock_server, 1, "Studio", 1).await;

    let listings = watcher.scan().await;
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].price.as_deref(), Some("450"));
}

#[tokio::test]
async fn test_failed_detail_does_not_drop_listing() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_search(
        &mock_server,
        search_page(&[ad_record(&base, 1, "R$ 500"), ad_record(&base, 2, "R$ 600")]),
    )
    .await;
    mount_detail(&mock_server, 1, "Studio", 1).await;
    Mock::given(method("GET"))
        .and(path("/ad/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut watcher = watcher(&mock_server);
    let listings = watcher.scan().await;

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].description, "Studio");
    assert_eq!(listings[1].title, "Apartment 2");
    assert!(listings[1].description.is_empty());
    assert!(listings[1].phone.is_none());
}

#[tokio::test]
async fn test_listing_page_error_is_a_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut watcher = watcher(&mock_server);
    match watcher.poll().await {
        ScanOutcome::Failed(ScanFailure::Transport(FetchError::Status { status, .. })) => {
            assert_eq!(status, 500);
        }
        other => panic!("expected transport failure, got {:?}", other),
    }
    assert!(watcher.current_listings().is_none());
}

#[tokio::test]
async fn test_page_without_embedded_data_is_a_failure() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "<html><body>Maintenance</body></html>".to_string()).await;

    let mut watcher = watcher(&mock_server);
    let outcome = watcher.poll().await;

    assert!(matches!(outcome, ScanOutcome::Failed(ScanFailure::ListingData(_))));
    assert!(outcome.into_new_listings().is_empty());
}

#[tokio::test]
async fn test_scan_is_capped() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    let ads: Vec<_> = (1..=14).map(|id| ad_record(&base, id, "R$ 100")).collect();
    mount_search(&mock_server, search_page(&ads)).await;
    for id in 1..=10 {
        mount_detail(&mock_server, id, "Room", 1).await;
    }
    for id in 11..=14 {
        mount_detail(&mock_server, id, "Room", 0).await;
    }

    let mut watcher = watcher(&mock_server);
    let listings = watcher.scan().await;

    assert_eq!(listings.len(), 10);
    assert_eq!(listings[9].title, "Apartment 10");
}
