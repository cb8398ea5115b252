//! Batch orchestration
//!
//! Drives a newline-separated list of identifiers through classify → fetch →
//! render → post-process, strictly sequentially and in input order. Every
//! failure is isolated to its entry and converted into an inline HTML error
//! message; a batch never aborts. Ordering policy: sequential numbering in
//! input order, or alphabetical by first-author family name with failures
//! appended last and no numbering at all.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::Client;
use crate::config::DEFAULT_STYLE;
use crate::error::{CitationError, Result};
use crate::postprocess::postprocess_entry;
use crate::record::BibliographicRecord;
use crate::sources::Source;

/// Request body of the single generate endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    /// Newline-separated publication identifiers
    #[serde(default)]
    pub ids: String,
    /// CSL style name
    #[serde(default = "default_style")]
    pub style: String,
    /// Sort successful entries alphabetically instead of numbering them
    #[serde(default, rename = "sortAlphabetically")]
    pub sort_alphabetically: bool,
}

fn default_style() -> String {
    DEFAULT_STYLE.to_string()
}

/// Response body: one HTML (or HTML-error) fragment per non-blank input line,
/// in final display order
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub citations: Vec<String>,
}

/// Per-input-line processing unit, alive only for the duration of one batch
#[derive(Debug, Clone)]
pub struct CitationEntry {
    /// The fetched record; `None` when the fetch failed
    pub record: Option<BibliographicRecord>,
    /// Lowercase first-author family name; empty on failure
    pub sort_key: String,
    /// The identifier exactly as entered
    pub original_id: String,
    /// Whether the fetch failed
    pub failed: bool,
}

impl Client {
    /// Process one batch of identifiers into rendered bibliography entries
    ///
    /// Never fails as a whole: each entry either renders or becomes an inline
    /// error string.
    pub async fn generate(&self, request: &GenerateRequest) -> GenerateResponse {
        let style = if request.style.trim().is_empty() {
            DEFAULT_STYLE
        } else {
            request.style.trim()
        };

        let mut entries = Vec::new();
        for line in request.ids.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            entries.push(self.fetch_entry(line).await);
        }

        let entries = order_entries(entries, request.sort_alphabetically);

        let mut citations = Vec::with_capacity(entries.len());
        let mut citation_number = 1usize;
        for entry in &entries {
            let target = if request.sort_alphabetically {
                None
            } else {
                let n = citation_number;
                citation_number += 1;
                Some(n)
            };

            let html = match &entry.record {
                Some(record) => self.render_entry(record, style, target).await,
                None => failure_message(target, &entry.original_id),
            };
            citations.push(html);
        }

        info!(
            total = citations.len(),
            style,
            alphabetical = request.sort_alphabetically,
            "Batch complete"
        );
        GenerateResponse { citations }
    }

    /// Classify, fetch and build one input line into an entry, tagging
    /// failures instead of propagating them
    async fn fetch_entry(&self, line: &str) -> CitationEntry {
        let source = Source::classify(line);
        match self.fetch_record(source, line).await {
            Ok(record) => CitationEntry {
                sort_key: record.sort_key(),
                record: Some(record),
                original_id: line.to_string(),
                failed: false,
            },
            Err(e) => {
                warn!(id = line, source = %source, error = %e, "Fetch failed");
                CitationEntry {
                    record: None,
                    sort_key: String::new(),
                    original_id: line.to_string(),
                    failed: true,
                }
            }
        }
    }

    /// Render one record and repair the renderer's output, converting any
    /// failure into the per-entry error string
    async fn render_entry(
        &self,
        record: &BibliographicRecord,
        style: &str,
        citation_number: Option<usize>,
    ) -> String {
        match self.try_render_entry(record, style, citation_number).await {
            Ok(html) => html,
            Err(CitationError::StyleNotFound { .. }) => {
                self.trace
                    .record_error(&record.id, style, "style could not be resolved");
                "Style Load Error".to_string()
            }
            Err(e) => {
                self.trace.record_error(&record.id, style, &e.to_string());
                format!("CSL Formatting Error for {}: {e}", record.id)
            }
        }
    }

    async fn try_render_entry(
        &self,
        record: &BibliographicRecord,
        style: &str,
        citation_number: Option<usize>,
    ) -> Result<String> {
        let style_path = self.styles.resolve(style).await?;

        self.trace.record_input(&record.id, style, record);
        let raw = self.renderer.render(record, &style_path)?;
        self.trace.record_raw_output(&record.id, style, &raw);

        if raw.trim().is_empty() {
            return Ok(format!(
                "CSL Formatting produced no output for {}",
                record.id
            ));
        }

        let finished = postprocess_entry(&raw, record, citation_number);
        self.trace.record_final_output(&record.id, style, &finished);
        Ok(finished)
    }
}

/// Apply the ordering policy
///
/// In alphabetical mode, successful entries are stable-sorted by sort key
/// (ties keep input order) and all failed entries follow in their original
/// relative order. In sequential mode the input order is kept as-is.
fn order_entries(entries: Vec<CitationEntry>, alphabetical: bool) -> Vec<CitationEntry> {
    if !alphabetical {
        return entries;
    }
    let (mut successes, failures): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(|e| !e.failed);
    successes.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    successes.extend(failures);
    successes
}

/// Inline error entry for a failed fetch, numbered in sequential mode
fn failure_message(citation_number: Option<usize>, original_id: &str) -> String {
    let body = format!(
        "<span style='color:red'>Not Found or Fetch Error: {original_id}</span>"
    );
    match citation_number {
        Some(n) => format!("<i>{n}.</i> {body}"),
        None => body,
    }
}
