//! Integration tests for ArtifactClient.
//!
//! Uses wiremock for HTTP mocking. Tests cover fetch_bytes status mapping,
//! listing scraping, and the absence of retries.

use flakewatch_artifacts::{
    ArtifactClient, ArtifactError, ArtifactSource, ArtifactsConfig, ListingPattern,
    ARTIFACTS_USER_AGENT,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_client(mock_server: &MockServer) -> ArtifactClient {
    let config = ArtifactsConfig::default()
        .with_base_url(mock_server.uri())
        .with_timeout_secs(5);
    ArtifactClient::new(config).expect("failed to create client")
}

fn listing_page(entries: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body><div class=\"pure-g\">\n");
    for (icon, name) in entries {
        html.push_str(&format!(
            "<div class=\"pure-u-2-5\"><a href=\"/gcs/{name}\"><img src=\"/icons/{icon}.png\"> {name}</a></div>\n"
        ));
    }
    html.push_str("</div></body></html>\n");
    html
}

#[tokio::test]
async fn test_fetch_bytes_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job/1/finished.json"))
        .and(header("user-agent", ARTIFACTS_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"passed\":true}"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let url = format!("{}/job/1/finished.json", client.base_url());
    let bytes = client.fetch_bytes(&url).await.expect("fetch failed");

    assert_eq!(bytes, b"{\"passed\":true}");
}

#[tokio::test]
async fn test_fetch_bytes_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job/2/finished.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let url = format!("{}/job/2/finished.json", client.base_url());
    let err = client.fetch_bytes(&url).await.unwrap_err();

    assert!(matches!(err, ArtifactError::NotFound { .. }));
    assert!(err.is_skippable());
}

#[tokio::test]
async fn test_fetch_bytes_server_error_is_network_error_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job/3/finished.json"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let url = format!("{}/job/3/finished.json", client.base_url());
    let err = client.fetch_bytes(&url).await.unwrap_err();

    match err {
        ArtifactError::Network { message } => assert!(message.contains("503")),
        other => panic!("expected Network, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_bytes_connection_refused() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    drop(mock_server);

    let client = ArtifactClient::new(ArtifactsConfig::default().with_base_url(uri.clone()))
        .expect("failed to create client");
    let err = client
        .fetch_bytes(&format!("{uri}/anything"))
        .await
        .unwrap_err();

    assert!(matches!(err, ArtifactError::Network { .. }));
}

#[tokio::test]
async fn test_scrape_listing_returns_matches_in_order() {
    let mock_server = MockServer::start().await;

    let page = listing_page(&[
        ("back", ".."),
        ("dir", "9"),
        ("dir", "10"),
        ("dir", "11"),
        ("file", "latest-build.txt"),
    ]);

    Mock::given(method("GET"))
        .and(path("/my-job/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let url = format!("{}/my-job/", client.base_url());
    let ids = client
        .scrape_listing(&url, &ListingPattern::build_dirs())
        .await
        .expect("scrape failed");

    assert_eq!(ids, vec!["9", "10", "11"]);
}

#[tokio::test]
async fn test_scrape_listing_without_match_is_not_found() {
    let mock_server = MockServer::start().await;

    let page = listing_page(&[("file", "build-log.txt")]);

    Mock::given(method("GET"))
        .and(path("/junit/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let url = format!("{}/junit/", client.base_url());
    let err = client
        .scrape_listing(&url, &ListingPattern::junit_reports())
        .await
        .unwrap_err();

    assert!(matches!(err, ArtifactError::NotFound { .. }));
}

#[tokio::test]
async fn test_scrape_listing_propagates_http_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing-job/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let url = format!("{}/missing-job/", client.base_url());
    let err = client
        .scrape_listing(&url, &ListingPattern::build_dirs())
        .await
        .unwrap_err();

    assert!(matches!(err, ArtifactError::NotFound { .. }));
}

#[tokio::test]
async fn test_fetch_text_lossy_utf8() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blob"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'o', b'k', 0xff]))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let text = client
        .fetch_text(&format!("{}/blob", client.base_url()))
        .await
        .expect("fetch failed");

    assert!(text.starts_with("ok"));
}
