//! Diagnostic trace for citation processing
//!
//! When enabled, every entry leaves its intermediate forms on disk, keyed by
//! entry id and style name: the CSL-JSON input, the raw renderer output, the
//! final post-processed HTML, and any failure detail. The trace is purely
//! diagnostic: writes are best-effort and a failure to write never changes
//! user-visible behavior.

use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::record::BibliographicRecord;

/// Best-effort trace sink; a no-op when no directory is configured
#[derive(Debug, Clone, Default)]
pub struct DebugTrace {
    dir: Option<PathBuf>,
}

impl DebugTrace {
    /// A trace that discards everything
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// A trace writing stage files under `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Record the CSL-JSON input handed to the renderer
    pub fn record_input(&self, id: &str, style: &str, record: &BibliographicRecord) {
        let Ok(json) = serde_json::to_string_pretty(record) else {
            return;
        };
        self.write(id, style, "1_input_data.json", &json);
    }

    /// Record the renderer's raw HTML output
    pub fn record_raw_output(&self, id: &str, style: &str, html: &str) {
        self.write(id, style, "2_csl_raw_output.html", html);
    }

    /// Record the final post-processed HTML
    pub fn record_final_output(&self, id: &str, style: &str, html: &str) {
        self.write(id, style, "4_final_html_output.html", html);
    }

    /// Record failure detail for an entry
    pub fn record_error(&self, id: &str, style: &str, detail: &str) {
        self.write(id, style, "error.log", detail);
    }

    fn write(&self, id: &str, style: &str, stage: &str, content: &str) {
        let Some(dir) = &self.dir else {
            return;
        };
        let file = dir.join(format!("{}_{}_{stage}", sanitize(id), sanitize(style)));
        let result = fs::create_dir_all(dir).and_then(|_| fs::write(&file, content));
        if let Err(e) = result {
            warn!(file = %file.display(), error = %e, "Failed to write trace file");
        }
    }
}

/// Entry ids can contain path separators (bioRxiv DOIs); flatten them so every
/// trace file lands directly in the trace directory.
fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
