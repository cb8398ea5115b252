//! Style resolution tests against a mocked style repository

mod common;

use citegen::{CitationError, ClientConfig, StyleCache};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STYLE_BODY: &str = "<style xmlns=\"http://purl.org/net/xbiblio/csl\"/>";

fn cache_for(server: &MockServer, dir: &std::path::Path) -> StyleCache {
    let config = ClientConfig::new()
        .with_styles_base_url(server.uri())
        .with_style_dir(dir);
    StyleCache::new(config.create_http_client(), &config)
}

#[tokio::test]
async fn test_style_downloaded_once_then_served_from_disk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apa.csl"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STYLE_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = cache_for(&server, dir.path());

    let first = cache.resolve("apa").await.unwrap();
    assert_eq!(first, dir.path().join("apa.csl"));
    assert_eq!(std::fs::read_to_string(&first).unwrap(), STYLE_BODY);

    // Second resolution must not hit the repository again; the mock's
    // expect(1) verifies that on drop.
    let second = cache.resolve("apa").await.unwrap();
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_missing_style_falls_back_to_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nature.csl"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STYLE_BODY))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = cache_for(&server, dir.path());

    // "definitely-not-a-style" gets wiremock's 404, so the default is used.
    let resolved = cache.resolve("definitely-not-a-style").await.unwrap();
    assert_eq!(resolved, dir.path().join("nature.csl"));
}

#[tokio::test]
async fn test_unresolvable_style_is_an_error() {
    let server = MockServer::start().await;
    // No mocks at all: every download attempt gets a 404.

    let dir = tempfile::tempdir().unwrap();
    let cache = cache_for(&server, dir.path());

    let err = cache.resolve("chicago-author-date").await.unwrap_err();
    match err {
        CitationError::StyleNotFound { style } => assert_eq!(style, "chicago-author-date"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unsafe_style_name_never_reaches_the_repository() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nature.csl"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STYLE_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = cache_for(&server, dir.path());

    // The traversal attempt is rejected locally and only the default style
    // is requested, satisfying the expect(1) above.
    let resolved = cache.resolve("../../etc/passwd").await.unwrap();
    assert_eq!(resolved, dir.path().join("nature.csl"));
}

#[tokio::test]
async fn test_pre_seeded_style_needs_no_network() {
    let server = MockServer::start().await;

    let dir = tempfile::tempdir().unwrap();
    common::seed_style(dir.path(), "vancouver");
    let cache = cache_for(&server, dir.path());

    let resolved = cache.resolve("vancouver").await.unwrap();
    assert_eq!(resolved, dir.path().join("vancouver.csl"));
    server.verify().await;
}
