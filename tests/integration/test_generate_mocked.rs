//! End-to-end batch tests against mocked upstream APIs
//!
//! The three metadata sources and the style repository are replaced by a
//! wiremock server and the CSL renderer by a deterministic stand-in, so these
//! tests pin the exact HTML the pipeline produces.

mod common;

use citegen::{Client, GenerateRequest};
use common::{
    MockRenderer, init_test_logging, mock_arxiv, mock_biorxiv, mock_config, mock_esummary,
    mock_esummary_not_found, seed_style,
};
use wiremock::MockServer;

fn request(ids: &str, sort_alphabetically: bool) -> GenerateRequest {
    GenerateRequest {
        ids: ids.to_string(),
        style: "nature".to_string(),
        sort_alphabetically,
    }
}

#[tokio::test]
async fn test_sequential_batch_numbers_all_sources_and_isolates_failures() {
    init_test_logging();
    let server = MockServer::start().await;
    mock_esummary(
        &server,
        "12345678",
        "A pneumonia outbreak",
        "Nature",
        2020,
        &["Wu F", "Zhao S"],
    )
    .await;
    mock_biorxiv(
        &server,
        "10.1101/2020.01.01.123456",
        "A preprint study",
        "Jane Adams",
        "2021-03-01",
    )
    .await;
    mock_arxiv(
        &server,
        "2001.12345",
        "Quantum widgets",
        "2020-01-30T18:44:27Z",
        &["Fan Wu"],
    )
    .await;
    mock_esummary_not_found(&server, "not-a-real-id").await;

    let style_dir = tempfile::tempdir().unwrap();
    seed_style(style_dir.path(), "nature");

    let config = mock_config(&server, style_dir.path());
    let client = Client::with_config(config, Box::new(MockRenderer::default()));

    let ids = "12345678\n10.1101/2020.01.01.123456\n\n2001.12345\nnot-a-real-id\n";
    let response = client.generate(&request(ids, false)).await;

    // The blank line is skipped; everything else yields one entry, numbered
    // in input order with failures numbered in place.
    assert_eq!(response.citations.len(), 4);
    assert_eq!(
        response.citations[0],
        "1.&nbsp;&nbsp;&nbsp;&nbsp;Wu, F., Zhao, S. A pneumonia outbreak. Nature (2020)."
    );
    assert_eq!(
        response.citations[1],
        "2.&nbsp;&nbsp;&nbsp;&nbsp;Adams, Jane A preprint study. bioRxiv (2021)."
    );
    assert_eq!(
        response.citations[2],
        "3.&nbsp;&nbsp;&nbsp;&nbsp;Wu, Fan Quantum widgets. arXiv preprint (2020)."
    );
    assert_eq!(
        response.citations[3],
        "<i>4.</i> <span style='color:red'>Not Found or Fetch Error: not-a-real-id</span>"
    );
}

#[tokio::test]
async fn test_alphabetical_batch_sorts_by_family_and_strips_numbers() {
    let server = MockServer::start().await;
    mock_esummary(&server, "111", "The last study", "Nature", 2019, &["Zhang W"]).await;
    mock_esummary(&server, "222", "The first study", "Nature", 2019, &["Adams J"]).await;
    mock_esummary_not_found(&server, "333").await;

    let style_dir = tempfile::tempdir().unwrap();
    seed_style(style_dir.path(), "nature");

    let config = mock_config(&server, style_dir.path());
    let client = Client::with_config(config, Box::new(MockRenderer::default()));

    let response = client.generate(&request("111\n222\n333", true)).await;

    assert_eq!(response.citations.len(), 3);
    assert_eq!(
        response.citations[0],
        "Adams, J. The first study. Nature (2019)."
    );
    assert_eq!(
        response.citations[1],
        "Zhang, W. The last study. Nature (2019)."
    );
    // Failures come last and carry no number either.
    assert_eq!(
        response.citations[2],
        "<span style='color:red'>Not Found or Fetch Error: 333</span>"
    );
}

#[tokio::test]
async fn test_et_al_inserted_when_renderer_truncates_silently() {
    let server = MockServer::start().await;
    mock_esummary(
        &server,
        "444",
        "Viral dynamics",
        "Nature",
        2020,
        &["Wu F", "Zhao S", "Chen L"],
    )
    .await;

    let style_dir = tempfile::tempdir().unwrap();
    seed_style(style_dir.path(), "nature");

    let config = mock_config(&server, style_dir.path());
    let renderer = MockRenderer {
        max_authors: 1,
        emit_et_al: false,
    };
    let client = Client::with_config(config, Box::new(renderer));

    let response = client.generate(&request("444", false)).await;

    assert_eq!(
        response.citations[0],
        "1.&nbsp;&nbsp;&nbsp;&nbsp;Wu, F. <i>et al.</i> Viral dynamics. Nature (2020)."
    );
}

#[tokio::test]
async fn test_engine_emitted_et_al_is_italicized_not_duplicated() {
    let server = MockServer::start().await;
    mock_esummary(
        &server,
        "555",
        "Viral dynamics",
        "Nature",
        2020,
        &["Wu F", "Zhao S", "Chen L"],
    )
    .await;

    let style_dir = tempfile::tempdir().unwrap();
    seed_style(style_dir.path(), "nature");

    let config = mock_config(&server, style_dir.path());
    let renderer = MockRenderer {
        max_authors: 1,
        emit_et_al: true,
    };
    let client = Client::with_config(config, Box::new(renderer));

    let response = client.generate(&request("555", false)).await;

    assert_eq!(
        response.citations[0],
        "1.&nbsp;&nbsp;&nbsp;&nbsp;Wu, F. <i>et al.</i> Viral dynamics. Nature (2020)."
    );
    assert_eq!(response.citations[0].matches("<i>et al.</i>").count(), 1);
}

#[tokio::test]
async fn test_unresolvable_style_yields_style_load_error() {
    let server = MockServer::start().await;
    mock_esummary(&server, "666", "A study", "Nature", 2020, &["Wu F"]).await;
    // No style mocks mounted: every style download gets wiremock's 404, and
    // the empty cache directory has nothing to fall back to.

    let style_dir = tempfile::tempdir().unwrap();
    let config = mock_config(&server, style_dir.path());
    let client = Client::with_config(config, Box::new(MockRenderer::default()));

    let response = client
        .generate(&GenerateRequest {
            ids: "666".to_string(),
            style: "chicago-author-date".to_string(),
            sort_alphabetically: false,
        })
        .await;

    assert_eq!(response.citations, vec!["Style Load Error".to_string()]);
}

#[tokio::test]
async fn test_trace_files_written_per_stage() {
    let server = MockServer::start().await;
    mock_esummary(&server, "777", "A study", "Nature", 2020, &["Wu F"]).await;

    let style_dir = tempfile::tempdir().unwrap();
    seed_style(style_dir.path(), "nature");
    let trace_dir = tempfile::tempdir().unwrap();

    let config = mock_config(&server, style_dir.path()).with_trace_dir(trace_dir.path());
    let client = Client::with_config(config, Box::new(MockRenderer::default()));

    client.generate(&request("777", false)).await;

    let mut names: Vec<String> = std::fs::read_dir(trace_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        [
            "777_nature_1_input_data.json",
            "777_nature_2_csl_raw_output.html",
            "777_nature_4_final_html_output.html",
        ]
    );
}
