//! PubMed metadata fetcher
//!
//! Fetches article summaries from the NCBI E-utilities ESummary API
//! (`esummary.fcgi`, JSON mode) and normalizes them into
//! [`BibliographicRecord`]s. ESummary author names come in the
//! `"Family Initials"` shape, so they are parsed family-first.

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{CitationError, Result};
use crate::name::{NameOrder, parse_author};
use crate::record::{ARTICLE_JOURNAL, BibliographicRecord, IssuedDate};

/// One author entry of an ESummary document summary
#[derive(Debug, Clone, Deserialize)]
pub struct ESummaryAuthor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub authtype: String,
}

/// The fields of an ESummary document summary this pipeline consumes
#[derive(Debug, Clone, Deserialize)]
pub struct PubMedSummary {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "fulljournalname")]
    pub full_journal_name: String,
    /// Abbreviated journal name, used when the full name is absent
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub volume: String,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub pages: String,
    #[serde(default)]
    pub pubdate: String,
    #[serde(default)]
    pub authors: Vec<ESummaryAuthor>,
}

/// Fetcher for PubMed article metadata
#[derive(Clone)]
pub struct PubMedFetcher {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    email: Option<String>,
}

impl PubMedFetcher {
    /// Create a fetcher sharing the given HTTP client
    pub fn new(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.effective_pubmed_base_url().to_string(),
            api_key: config.api_key.clone(),
            email: config.email.clone(),
        }
    }

    /// Fetch the record for one PMID
    ///
    /// # Errors
    ///
    /// * `CitationError::RecordNotFound` - unknown PMID
    /// * `CitationError::RequestError` - transport failure or timeout
    /// * `CitationError::ApiError` - upstream returned an unusable payload
    #[instrument(skip(self))]
    pub async fn fetch_record(&self, pmid: &str) -> Result<BibliographicRecord> {
        let mut url = format!(
            "{}/esummary.fcgi?db=pubmed&retmode=json&id={}",
            self.base_url,
            urlencoding::encode(pmid)
        );
        if let Some(api_key) = &self.api_key {
            url.push_str(&format!("&api_key={}", urlencoding::encode(api_key)));
        }
        if let Some(email) = &self.email {
            url.push_str(&format!("&email={}", urlencoding::encode(email)));
        }

        debug!(pmid, "Fetching PubMed summary");
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(CitationError::ApiError {
                message: format!("ESummary request failed with status {}", response.status()),
            });
        }

        let body: serde_json::Value = response.json().await?;
        let summary = body
            .get("result")
            .and_then(|result| result.get(pmid))
            .cloned()
            .ok_or_else(|| CitationError::RecordNotFound {
                origin: "pubmed",
                id: pmid.to_string(),
            })?;

        // ESummary reports unknown ids inside the result map rather than via
        // the HTTP status.
        if summary.get("error").is_some() {
            warn!(pmid, "ESummary reported an error for this id");
            return Err(CitationError::RecordNotFound {
                origin: "pubmed",
                id: pmid.to_string(),
            });
        }

        let summary: PubMedSummary = serde_json::from_value(summary)?;
        build_record(pmid, &summary)
    }
}

/// Assemble the canonical record from an ESummary document summary
pub fn build_record(pmid: &str, summary: &PubMedSummary) -> Result<BibliographicRecord> {
    let year = parse_year(&summary.pubdate).ok_or_else(|| CitationError::ApiError {
        message: format!("missing publication year for PMID {pmid}"),
    })?;

    let author = summary
        .authors
        .iter()
        .filter(|a| !a.name.trim().is_empty())
        .filter_map(|a| parse_author(&a.name, NameOrder::FamilyFirst))
        .collect();

    let journal = if summary.full_journal_name.trim().is_empty() {
        summary.source.clone()
    } else {
        summary.full_journal_name.clone()
    };

    Ok(BibliographicRecord {
        id: pmid.to_string(),
        item_type: ARTICLE_JOURNAL.to_string(),
        title: summary.title.clone(),
        container_title: journal,
        volume: non_empty(&summary.volume),
        issue: non_empty(&summary.issue),
        page: non_empty(&summary.pages),
        author,
        issued: IssuedDate::year(year),
        url: None,
    })
}

/// First four-digit token of a loosely formatted pubdate like `"2020 Jan 30"`
fn parse_year(pubdate: &str) -> Option<i32> {
    pubdate
        .split_whitespace()
        .find(|token| token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()))
        .and_then(|token| token.parse().ok())
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
