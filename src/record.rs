//! Canonical bibliographic records
//!
//! A [`BibliographicRecord`] is the CSL-JSON-shaped unit every source payload
//! is normalized into before rendering. It is created once per successfully
//! fetched identifier and immutable afterwards; the author sequence preserves
//! source order, which determines both the sort key (first author) and the
//! et-al truncation boundary during post-processing.

use serde::{Deserialize, Serialize};

use crate::name::PersonName;

/// CSL-JSON issued date as nested date parts (`[[year, month?, day?]]`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedDate {
    #[serde(rename = "date-parts")]
    pub date_parts: Vec<Vec<i32>>,
}

impl IssuedDate {
    /// Year-only issued date
    pub fn year(year: i32) -> Self {
        Self {
            date_parts: vec![vec![year]],
        }
    }

    /// Full issued date
    pub fn ymd(year: i32, month: i32, day: i32) -> Self {
        Self {
            date_parts: vec![vec![year, month, day]],
        }
    }
}

/// One bibliographic record in CSL-JSON shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BibliographicRecord {
    /// Entry identifier (the original input id)
    pub id: String,
    /// CSL item type; always `"article-journal"` in this pipeline
    #[serde(rename = "type")]
    pub item_type: String,
    /// Article title
    pub title: String,
    /// Journal or venue name
    #[serde(rename = "container-title")]
    pub container_title: String,
    /// Volume, when the source provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    /// Issue, when the source provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    /// Page range or page-like identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    /// Authors in source-listed order
    #[serde(default)]
    pub author: Vec<PersonName>,
    /// Publication date
    pub issued: IssuedDate,
    /// Canonical URL of the entry, when known
    #[serde(rename = "URL", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// CSL item type shared by every record this pipeline produces
pub const ARTICLE_JOURNAL: &str = "article-journal";

impl BibliographicRecord {
    /// Family name of the first listed author, if any
    pub fn first_author_family(&self) -> Option<&str> {
        self.author.first().map(|a| a.family.as_str())
    }

    /// Alphabetical sort key: lowercase family name of the first author,
    /// empty when the record has no authors
    pub fn sort_key(&self) -> String {
        self.first_author_family()
            .map(|f| f.to_lowercase())
            .unwrap_or_default()
    }
}
