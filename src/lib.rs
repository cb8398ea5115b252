//! # citegen
//!
//! Turns lists of publication identifiers (PubMed IDs, arXiv IDs, bioRxiv
//! DOIs) into formatted bibliography entries in a chosen Citation Style
//! Language style.
//!
//! The crate fetches metadata from the three upstream sources, normalizes the
//! loosely structured author-name strings each of them returns into canonical
//! CSL-JSON records, hands each record to an external CSL renderer, and then
//! repairs the renderer's output: inserting or italicizing "et al." when the
//! author list was truncated, rewriting citation numbering to match the
//! requested ordering, and cleaning up punctuation artifacts.
//!
//! ## Features
//!
//! - **Heterogeneous name parsing**: family-first (PubMed) and family-last
//!   (arXiv/bioRxiv) author strings, with non-dropping particles ("von",
//!   "van") and initials normalization
//! - **Citation post-processing**: targeted text surgery on rendered HTML,
//!   expressed as an ordered sequence of pure rewrite passes
//! - **Batch orchestration**: sequential numbering or alphabetical ordering,
//!   with per-entry failure isolation
//! - **Style cache**: lazy, disk-backed cache of CSL style definitions with a
//!   fallback to the default style
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use citegen::{BibliographicRecord, BibliographyRenderer, Client, ClientConfig};
//! use citegen::{GenerateRequest, Result};
//!
//! struct MyCslEngine;
//!
//! impl BibliographyRenderer for MyCslEngine {
//!     fn render(&self, record: &BibliographicRecord, style_path: &Path) -> Result<String> {
//!         // Hand the CSL-JSON record and style file to a real CSL processor.
//!         todo!()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ClientConfig::from_env().with_email("citation-tool-contact@example.com");
//!     let client = Client::with_config(config, Box::new(MyCslEngine));
//!
//!     let request = GenerateRequest {
//!         ids: "12345678\n2001.12345\n10.1101/2020.01.01.123456".to_string(),
//!         style: "nature".to_string(),
//!         sort_alphabetically: false,
//!     };
//!     let response = client.generate(&request).await;
//!     for citation in response.citations {
//!         println!("{citation}");
//!     }
//! }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod name;
pub mod postprocess;
pub mod record;
pub mod render;
pub mod sources;
pub mod style;
pub mod trace;

// Re-export main types for convenience
pub use batch::{CitationEntry, GenerateRequest, GenerateResponse};
pub use config::{ClientConfig, DEFAULT_STYLE};
pub use error::{CitationError, Result};
pub use name::{NameOrder, PersonName, format_given_name, parse_author};
pub use record::{BibliographicRecord, IssuedDate};
pub use render::BibliographyRenderer;
pub use sources::Source;
pub use style::StyleCache;
pub use trace::DebugTrace;

use sources::{ArxivFetcher, BioRxivFetcher, PubMedFetcher};

/// Combined client owning the per-source fetchers, the style cache, the
/// renderer seam and the diagnostic trace
pub struct Client {
    /// PubMed metadata fetcher
    pub pubmed: PubMedFetcher,
    /// arXiv metadata fetcher
    pub arxiv: ArxivFetcher,
    /// bioRxiv metadata fetcher
    pub biorxiv: BioRxivFetcher,
    pub(crate) styles: StyleCache,
    pub(crate) renderer: Box<dyn BibliographyRenderer>,
    pub(crate) trace: DebugTrace,
}

impl Client {
    /// Create a client with default configuration and the given renderer
    pub fn new(renderer: Box<dyn BibliographyRenderer>) -> Self {
        Self::with_config(ClientConfig::new(), renderer)
    }

    /// Create a client from an explicit configuration
    ///
    /// One HTTP client is built from the configuration (timeout, user agent)
    /// and shared by every fetcher and the style cache.
    pub fn with_config(config: ClientConfig, renderer: Box<dyn BibliographyRenderer>) -> Self {
        let http = config.create_http_client();
        let trace = match &config.trace_dir {
            Some(dir) => DebugTrace::new(dir),
            None => DebugTrace::disabled(),
        };

        Self {
            pubmed: PubMedFetcher::new(http.clone(), &config),
            arxiv: ArxivFetcher::new(http.clone(), &config),
            biorxiv: BioRxivFetcher::new(http.clone(), &config),
            styles: StyleCache::new(http, &config),
            renderer,
            trace,
        }
    }

    /// Fetch and build the canonical record for one identifier
    pub async fn fetch_record(&self, source: Source, id: &str) -> Result<BibliographicRecord> {
        match source {
            Source::PubMed => self.pubmed.fetch_record(id).await,
            Source::ArXiv => self.arxiv.fetch_record(id).await,
            Source::BioRxiv => self.biorxiv.fetch_record(id).await,
        }
    }
}
