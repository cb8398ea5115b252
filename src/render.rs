//! Rendering seam for the external CSL processor
//!
//! The actual Citation Style Language engine is an external collaborator:
//! this crate hands it one CSL-JSON record plus a style definition file and
//! receives one rendered HTML bibliography entry back. Everything the engine
//! gets wrong afterwards (missing "et al.", glued numbering, stray periods)
//! is repaired in [`crate::postprocess`].

use std::path::Path;

use crate::error::Result;
use crate::record::BibliographicRecord;

/// A CSL processor capable of rendering one bibliography entry at a time
///
/// Implementations load the style definition at `style_path`, feed it the
/// record as CSL-JSON, and return the rendered HTML fragment for that single
/// entry. Batching is one record per call in this design.
pub trait BibliographyRenderer: Send + Sync {
    /// Render one record with the given style
    ///
    /// # Errors
    ///
    /// Returns `CitationError::RenderError` when the style cannot be loaded or
    /// the engine fails on this record. The failure is isolated to the entry;
    /// the batch orchestrator converts it into an inline error message.
    fn render(&self, record: &BibliographicRecord, style_path: &Path) -> Result<String>;
}

impl<R: BibliographyRenderer + ?Sized> BibliographyRenderer for Box<R> {
    fn render(&self, record: &BibliographicRecord, style_path: &Path) -> Result<String> {
        (**self).render(record, style_path)
    }
}
