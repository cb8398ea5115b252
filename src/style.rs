//! CSL style resolution and on-disk cache
//!
//! Maps a style name (e.g. `"nature"`) to a local `.csl` file, downloading it
//! from the public Citation Style Language repository on first use. Style
//! files are treated as immutable once named: the cache is populated lazily
//! and never invalidated, and concurrent writers for the same name are
//! harmless (last writer wins, identical content).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{ClientConfig, DEFAULT_STYLE};
use crate::error::{CitationError, Result};

/// Disk-backed cache of CSL style definitions
#[derive(Clone)]
pub struct StyleCache {
    client: reqwest::Client,
    dir: PathBuf,
    base_url: String,
}

impl StyleCache {
    /// Create a cache sharing the given HTTP client
    pub fn new(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            dir: config.style_dir.clone(),
            base_url: config.effective_styles_base_url().to_string(),
        }
    }

    /// Resolve a style name to a local file path
    ///
    /// Checks the cache directory first, then downloads from the style
    /// repository. When the requested style cannot be obtained, one fallback
    /// attempt is made for the default style (`"nature"`).
    ///
    /// # Errors
    ///
    /// Returns `CitationError::StyleNotFound` only when neither the requested
    /// style nor the default can be resolved.
    pub async fn resolve(&self, style_name: &str) -> Result<PathBuf> {
        if let Some(path) = self.try_resolve(style_name).await {
            return Ok(path);
        }
        if style_name != DEFAULT_STYLE {
            warn!(
                style = style_name,
                "Style not available; falling back to '{DEFAULT_STYLE}'"
            );
            if let Some(path) = self.try_resolve(DEFAULT_STYLE).await {
                return Ok(path);
            }
        }
        Err(CitationError::StyleNotFound {
            style: style_name.to_string(),
        })
    }

    /// One resolution attempt: local hit, or download. Failures are logged
    /// and reported as a miss so the caller can fall back.
    async fn try_resolve(&self, style_name: &str) -> Option<PathBuf> {
        if !is_safe_style_name(style_name) {
            warn!(style = style_name, "Rejecting unsafe style name");
            return None;
        }

        let path = self.dir.join(format!("{style_name}.csl"));
        if path.exists() {
            debug!(style = style_name, "Style cache hit");
            return Some(path);
        }

        let url = format!("{}/{}.csl", self.base_url, style_name);
        match self.download(&url, &path).await {
            Ok(true) => {
                info!(style = style_name, "Downloaded CSL style");
                Some(path)
            }
            Ok(false) => {
                warn!(style = style_name, "Style not found in repository");
                None
            }
            Err(e) => {
                warn!(style = style_name, error = %e, "Style download failed");
                None
            }
        }
    }

    async fn download(&self, url: &str, path: &Path) -> Result<bool> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let bytes = response.bytes().await?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &bytes)?;
        Ok(true)
    }
}

/// Style names map directly onto repository paths and cache file names, so
/// anything that could escape the cache directory is rejected.
fn is_safe_style_name(style_name: &str) -> bool {
    !style_name.is_empty()
        && !style_name.contains("..")
        && style_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
