//! Metadata sources and identifier classification
//!
//! Each supported upstream (PubMed, arXiv, bioRxiv) has its own fetcher that
//! turns an identifier into a [`crate::BibliographicRecord`]. Which fetcher
//! handles a raw input line is decided purely from the syntactic shape of the
//! identifier.

pub mod arxiv;
pub mod biorxiv;
pub mod pubmed;

pub use arxiv::ArxivFetcher;
pub use biorxiv::BioRxivFetcher;
pub use pubmed::PubMedFetcher;

use std::fmt;

use crate::name::NameOrder;

/// A supported metadata source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    PubMed,
    ArXiv,
    BioRxiv,
}

impl Source {
    /// Classify a trimmed input line by its syntactic shape
    ///
    /// - all digits: PubMed ID
    /// - contains `"10.1101"`: bioRxiv DOI (the bioRxiv DOI prefix)
    /// - contains a period and shorter than 15 characters: arXiv ID
    /// - anything else: defaults to PubMed
    ///
    /// # Examples
    ///
    /// ```
    /// use citegen::sources::Source;
    ///
    /// assert_eq!(Source::classify("12345678"), Source::PubMed);
    /// assert_eq!(Source::classify("10.1101/2020.01.01.123456"), Source::BioRxiv);
    /// assert_eq!(Source::classify("2001.12345"), Source::ArXiv);
    /// assert_eq!(Source::classify("not-a-real-id"), Source::PubMed);
    /// ```
    pub fn classify(line: &str) -> Source {
        if !line.is_empty() && line.chars().all(|c| c.is_ascii_digit()) {
            Source::PubMed
        } else if line.contains("10.1101") {
            Source::BioRxiv
        } else if line.contains('.') && line.len() < 15 {
            Source::ArXiv
        } else {
            Source::PubMed
        }
    }

    /// Token order of raw author names from this source
    pub fn name_order(&self) -> NameOrder {
        match self {
            Source::PubMed => NameOrder::FamilyFirst,
            Source::ArXiv | Source::BioRxiv => NameOrder::FamilyLast,
        }
    }

    /// Short lowercase tag used in errors and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::PubMed => "pubmed",
            Source::ArXiv => "arxiv",
            Source::BioRxiv => "biorxiv",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
