//! bioRxiv metadata fetcher
//!
//! Fetches preprint details from the bioRxiv API
//! (`/details/biorxiv/{doi}`) and normalizes them into
//! [`BibliographicRecord`]s. All authors arrive semicolon-joined in a single
//! field, in the `"Given Family"` shape, so the field is split before each
//! name is parsed family-last.

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{CitationError, Result};
use crate::name::{NameOrder, parse_author};
use crate::record::{ARTICLE_JOURNAL, BibliographicRecord, IssuedDate};

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    messages: Vec<DetailsMessage>,
    #[serde(default)]
    collection: Vec<BioRxivItem>,
}

#[derive(Debug, Deserialize)]
struct DetailsMessage {
    #[serde(default)]
    status: String,
}

/// One preprint version from the bioRxiv details collection
#[derive(Debug, Clone, Deserialize)]
pub struct BioRxivItem {
    #[serde(default)]
    pub title: String,
    /// Semicolon-joined author list
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub doi: String,
    /// Posting date, `"YYYY-MM-DD"`
    #[serde(default)]
    pub date: String,
}

/// Fetcher for bioRxiv preprint metadata
#[derive(Clone)]
pub struct BioRxivFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl BioRxivFetcher {
    /// Create a fetcher sharing the given HTTP client
    pub fn new(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.effective_biorxiv_base_url().to_string(),
        }
    }

    /// Fetch the record for one bioRxiv DOI (`10.1101/...`)
    ///
    /// # Errors
    ///
    /// * `CitationError::RecordNotFound` - the API did not report an ok status
    ///   or returned an empty collection
    /// * `CitationError::RequestError` - transport failure or timeout
    #[instrument(skip(self))]
    pub async fn fetch_record(&self, doi: &str) -> Result<BibliographicRecord> {
        let url = format!("{}/details/biorxiv/{}", self.base_url, doi);

        debug!(doi, "Fetching bioRxiv details");
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(CitationError::ApiError {
                message: format!("bioRxiv request failed with status {}", response.status()),
            });
        }

        let details: DetailsResponse = response.json().await?;
        let status_ok = details
            .messages
            .first()
            .is_some_and(|m| m.status == "ok");
        if !status_ok {
            warn!(doi, "bioRxiv reported a non-ok status");
            return Err(CitationError::RecordNotFound {
                origin: "biorxiv",
                id: doi.to_string(),
            });
        }

        // The collection lists every posted version; the last one is the most
        // recent.
        let item = details
            .collection
            .last()
            .ok_or_else(|| CitationError::RecordNotFound {
                origin: "biorxiv",
                id: doi.to_string(),
            })?;

        build_record(doi, item)
    }
}

/// Assemble the canonical record from a bioRxiv collection item
pub fn build_record(doi: &str, item: &BioRxivItem) -> Result<BibliographicRecord> {
    let year = parse_year(&item.date).ok_or_else(|| CitationError::ApiError {
        message: format!("missing posting year for bioRxiv doi {doi}"),
    })?;

    let author = item
        .authors
        .split(';')
        .filter_map(|raw| parse_author(raw, NameOrder::FamilyLast))
        .collect();

    Ok(BibliographicRecord {
        id: doi.to_string(),
        item_type: ARTICLE_JOURNAL.to_string(),
        title: item.title.clone(),
        container_title: "bioRxiv".to_string(),
        volume: None,
        issue: None,
        page: Some(item.doi.clone()),
        author,
        issued: IssuedDate::year(year),
        url: None,
    })
}

/// Year component of a `"YYYY-MM-DD"` posting date
fn parse_year(date: &str) -> Option<i32> {
    date.split('-').next()?.parse().ok()
}
