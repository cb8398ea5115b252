//! arXiv metadata fetcher
//!
//! Fetches entries from the arXiv Atom export API (`/api/query?id_list=`) and
//! normalizes them into [`BibliographicRecord`]s. Atom author names come in
//! the `"Given Family"` shape, so they are parsed family-last.

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::{CitationError, Result};
use crate::name::{NameOrder, parse_author};
use crate::record::{ARTICLE_JOURNAL, BibliographicRecord, IssuedDate};

/// Atom feed wrapper returned by the arXiv query endpoint
#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(default, rename = "entry")]
    entries: Vec<AtomEntry>,
}

/// One Atom entry
#[derive(Debug, Clone, Deserialize)]
pub struct AtomEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub published: String,
    #[serde(default, rename = "author")]
    pub authors: Vec<AtomAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AtomAuthor {
    #[serde(default)]
    pub name: String,
}

/// Fetcher for arXiv preprint metadata
#[derive(Clone)]
pub struct ArxivFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl ArxivFetcher {
    /// Create a fetcher sharing the given HTTP client
    pub fn new(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.effective_arxiv_base_url().to_string(),
        }
    }

    /// Fetch the record for one arXiv identifier
    ///
    /// # Errors
    ///
    /// * `CitationError::RecordNotFound` - unknown identifier
    /// * `CitationError::RequestError` - transport failure or timeout
    /// * `CitationError::XmlError` - malformed Atom response
    #[instrument(skip(self))]
    pub async fn fetch_record(&self, arxiv_id: &str) -> Result<BibliographicRecord> {
        let url = format!(
            "{}/query?id_list={}&max_results=1",
            self.base_url,
            urlencoding::encode(arxiv_id)
        );

        debug!(arxiv_id, "Fetching arXiv entry");
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(CitationError::ApiError {
                message: format!("arXiv request failed with status {}", response.status()),
            });
        }

        let body = response.text().await?;
        let feed: AtomFeed =
            quick_xml::de::from_str(&body).map_err(|e| CitationError::XmlError(e.to_string()))?;

        let entry = feed
            .entries
            .into_iter()
            // An unknown id still yields an entry, but one pointing at the
            // api/errors namespace instead of an abs URL.
            .find(|entry| !entry.id.is_empty() && !entry.id.contains("api/errors"))
            .ok_or_else(|| CitationError::RecordNotFound {
                origin: "arxiv",
                id: arxiv_id.to_string(),
            })?;

        build_record(arxiv_id, &entry)
    }
}

/// Assemble the canonical record from an Atom entry
pub fn build_record(arxiv_id: &str, entry: &AtomEntry) -> Result<BibliographicRecord> {
    let issued = parse_published(&entry.published).ok_or_else(|| CitationError::ApiError {
        message: format!("missing publication date for arXiv id {arxiv_id}"),
    })?;

    let author = entry
        .authors
        .iter()
        .filter_map(|a| parse_author(&a.name, NameOrder::FamilyLast))
        .collect();

    Ok(BibliographicRecord {
        id: arxiv_id.to_string(),
        item_type: ARTICLE_JOURNAL.to_string(),
        title: normalize_whitespace(&entry.title),
        container_title: "arXiv preprint".to_string(),
        volume: Some(format!("arXiv:{arxiv_id}")),
        issue: None,
        page: None,
        author,
        issued,
        url: Some(entry.id.clone()),
    })
}

/// Parse the date part of an Atom timestamp like `"2020-01-30T18:00:00Z"`
fn parse_published(published: &str) -> Option<IssuedDate> {
    let date = published.split('T').next()?;
    let mut parts = date.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: i32 = parts.next()?.parse().ok()?;
    let day: i32 = parts.next()?.parse().ok()?;
    Some(IssuedDate::ymd(year, month, day))
}

/// Atom titles wrap across lines; collapse all runs of whitespace
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
