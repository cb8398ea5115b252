//! Per-source fetch tests against mocked upstream APIs

mod common;

use citegen::{CitationError, Client, ClientConfig, IssuedDate, Source};
use common::{
    MockRenderer, init_test_logging, mock_arxiv, mock_biorxiv, mock_biorxiv_not_found, mock_config,
    mock_esummary, mock_esummary_not_found,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Client {
    let config = mock_config(server, std::path::Path::new("csl_styles"));
    Client::with_config(config, Box::new(MockRenderer::default()))
}

#[tokio::test]
async fn test_pubmed_fetch_builds_record() {
    init_test_logging();
    let server = MockServer::start().await;
    mock_esummary(
        &server,
        "31978945",
        "A pneumonia outbreak associated with a new coronavirus.",
        "Nature",
        2020,
        &["Wu F", "Zhao S", "von Bartheld CS"],
    )
    .await;

    let client = client_for(&server);
    let record = client.fetch_record(Source::PubMed, "31978945").await.unwrap();

    assert_eq!(record.id, "31978945");
    assert_eq!(record.container_title, "Nature");
    assert_eq!(record.volume.as_deref(), Some("579"));
    assert_eq!(record.page.as_deref(), Some("265-269"));
    assert_eq!(record.issued, IssuedDate::year(2020));
    assert_eq!(record.author.len(), 3);
    assert_eq!(record.author[0].family, "Wu");
    assert_eq!(record.author[0].given, "F.");
    assert_eq!(record.author[2].family, "Bartheld");
    assert_eq!(record.author[2].non_dropping_particle.as_deref(), Some("von"));
}

#[tokio::test]
async fn test_pubmed_sends_api_key_and_email() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "result": {
            "uids": ["1"],
            "1": {
                "uid": "1",
                "title": "T",
                "fulljournalname": "Nature",
                "pubdate": "2020",
                "authors": [{"name": "Wu F", "authtype": "Author"}]
            }
        }
    });
    Mock::given(method("GET"))
        .and(path("/esummary.fcgi"))
        .and(query_param("id", "1"))
        .and(query_param("api_key", "secret-key"))
        .and(query_param("email", "contact@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let config = mock_config(&server, std::path::Path::new("csl_styles"))
        .with_api_key("secret-key")
        .with_email("contact@example.com");
    let client = Client::with_config(config, Box::new(MockRenderer::default()));

    client.fetch_record(Source::PubMed, "1").await.unwrap();
}

#[tokio::test]
async fn test_pubmed_unknown_id_is_record_not_found() {
    let server = MockServer::start().await;
    mock_esummary_not_found(&server, "99999999").await;

    let client = client_for(&server);
    let err = client
        .fetch_record(Source::PubMed, "99999999")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CitationError::RecordNotFound { origin: "pubmed", .. }
    ));
}

#[tokio::test]
async fn test_pubmed_server_error_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esummary.fcgi"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_record(Source::PubMed, "1").await.unwrap_err();
    assert!(matches!(err, CitationError::ApiError { .. }));
}

#[tokio::test]
async fn test_arxiv_fetch_builds_record() {
    let server = MockServer::start().await;
    mock_arxiv(
        &server,
        "2001.12345",
        "Deep learning for citation parsing",
        "2020-01-30T18:00:00Z",
        &["Fan Wu", "John von Neumann"],
    )
    .await;

    let client = client_for(&server);
    let record = client
        .fetch_record(Source::ArXiv, "2001.12345")
        .await
        .unwrap();

    assert_eq!(record.id, "2001.12345");
    assert_eq!(record.container_title, "arXiv preprint");
    assert_eq!(record.volume.as_deref(), Some("arXiv:2001.12345"));
    assert_eq!(record.issued, IssuedDate::ymd(2020, 1, 30));
    assert_eq!(
        record.url.as_deref(),
        Some("http://arxiv.org/abs/2001.12345v1")
    );
    assert_eq!(record.author.len(), 2);
    assert_eq!(record.author[0].family, "Wu");
    assert_eq!(record.author[0].given, "Fan");
    assert_eq!(record.author[1].family, "Neumann");
    assert_eq!(record.author[1].non_dropping_particle.as_deref(), Some("von"));
}

#[tokio::test]
async fn test_arxiv_error_entry_is_record_not_found() {
    let server = MockServer::start().await;
    let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_bogus</id>
    <published>2020-01-30T18:00:00Z</published>
    <title>Error</title>
  </entry>
</feed>"#;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_record(Source::ArXiv, "bogus").await.unwrap_err();
    assert!(matches!(
        err,
        CitationError::RecordNotFound { origin: "arxiv", .. }
    ));
}

#[tokio::test]
async fn test_biorxiv_fetch_builds_record() {
    let server = MockServer::start().await;
    mock_biorxiv(
        &server,
        "10.1101/2020.01.01.123456",
        "Single-cell atlas of the developing brain",
        "Jane Adams; John von Neumann",
        "2020-06-15",
    )
    .await;

    let client = client_for(&server);
    let record = client
        .fetch_record(Source::BioRxiv, "10.1101/2020.01.01.123456")
        .await
        .unwrap();

    assert_eq!(record.id, "10.1101/2020.01.01.123456");
    assert_eq!(record.container_title, "bioRxiv");
    assert_eq!(record.page.as_deref(), Some("10.1101/2020.01.01.123456"));
    assert_eq!(record.issued, IssuedDate::year(2020));
    assert_eq!(record.author.len(), 2);
    assert_eq!(record.author[0].family, "Adams");
    assert_eq!(record.author[0].given, "Jane");
    assert_eq!(record.author[1].family, "Neumann");
    assert_eq!(record.author[1].non_dropping_particle.as_deref(), Some("von"));
}

#[tokio::test]
async fn test_biorxiv_unknown_doi_is_record_not_found() {
    let server = MockServer::start().await;
    mock_biorxiv_not_found(&server, "10.1101/0000.00.00.000000").await;

    let client = client_for(&server);
    let err = client
        .fetch_record(Source::BioRxiv, "10.1101/0000.00.00.000000")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CitationError::RecordNotFound { origin: "biorxiv", .. }
    ));
}

#[tokio::test]
async fn test_custom_timeout_configuration_is_accepted() {
    let server = MockServer::start().await;
    mock_esummary(&server, "1", "T", "Nature", 2020, &["Wu F"]).await;

    let config: ClientConfig = mock_config(&server, std::path::Path::new("csl_styles"))
        .with_timeout(std::time::Duration::from_secs(5));
    let client = Client::with_config(config, Box::new(MockRenderer::default()));

    assert!(client.fetch_record(Source::PubMed, "1").await.is_ok());
}
