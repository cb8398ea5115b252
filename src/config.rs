//! Client configuration for upstream metadata sources and the style repository
//!
//! All network-facing pieces of the crate are driven by a single
//! [`ClientConfig`] constructed once at startup and passed to [`crate::Client`].
//! This covers the NCBI credential and contact address, the per-fetch timeout,
//! and the base URLs of every upstream (overridable for testing against a mock
//! server).

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Default NCBI E-utilities base URL
pub const DEFAULT_PUBMED_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Default arXiv export API base URL
pub const DEFAULT_ARXIV_BASE_URL: &str = "https://export.arxiv.org/api";

/// Default bioRxiv details API base URL
pub const DEFAULT_BIORXIV_BASE_URL: &str = "https://api.biorxiv.org";

/// Default raw-content base URL of the public CSL styles repository
pub const DEFAULT_STYLES_BASE_URL: &str =
    "https://raw.githubusercontent.com/citation-style-language/styles/master";

/// Citation style used when none is requested or the requested one is missing
pub const DEFAULT_STYLE: &str = "nature";

/// Default per-fetch timeout applied to every upstream request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for citation clients
///
/// # Example
///
/// ```
/// use citegen::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_api_key("your_ncbi_api_key")
///     .with_email("citation-tool-contact@example.com");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// NCBI API key, sent with every PubMed request when present
    pub api_key: Option<String>,
    /// Contact e-mail address, sent to NCBI as recommended by their guidelines
    pub email: Option<String>,
    /// Timeout applied to each upstream fetch
    pub timeout: Duration,
    /// Custom User-Agent header
    pub user_agent: Option<String>,
    /// Override for the PubMed E-utilities base URL
    pub pubmed_base_url: Option<String>,
    /// Override for the arXiv API base URL
    pub arxiv_base_url: Option<String>,
    /// Override for the bioRxiv API base URL
    pub biorxiv_base_url: Option<String>,
    /// Override for the CSL styles repository base URL
    pub styles_base_url: Option<String>,
    /// Directory where downloaded CSL style files are cached
    pub style_dir: PathBuf,
    /// Directory for the diagnostic trace; disabled when `None`
    pub trace_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Create a new configuration with defaults and no API key
    pub fn new() -> Self {
        Self {
            api_key: None,
            email: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            pubmed_base_url: None,
            arxiv_base_url: None,
            biorxiv_base_url: None,
            styles_base_url: None,
            style_dir: PathBuf::from("csl_styles"),
            trace_dir: None,
        }
    }

    /// Create a configuration from the environment
    ///
    /// Reads `NCBI_API_KEY`. A missing key is not an error, but requests
    /// without one are subject to stricter NCBI rate limits, so a warning is
    /// logged.
    pub fn from_env() -> Self {
        let mut config = Self::new();
        match std::env::var("NCBI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => {
                config.api_key = Some(key);
            }
            _ => {
                warn!("NCBI API key not found in environment; you might hit rate limits");
            }
        }
        config
    }

    /// Set the NCBI API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the contact e-mail address sent to NCBI
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the per-fetch timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Override the PubMed E-utilities base URL (useful for testing)
    pub fn with_pubmed_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.pubmed_base_url = Some(base_url.into());
        self
    }

    /// Override the arXiv API base URL (useful for testing)
    pub fn with_arxiv_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.arxiv_base_url = Some(base_url.into());
        self
    }

    /// Override the bioRxiv API base URL (useful for testing)
    pub fn with_biorxiv_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.biorxiv_base_url = Some(base_url.into());
        self
    }

    /// Override the CSL styles repository base URL (useful for testing)
    pub fn with_styles_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.styles_base_url = Some(base_url.into());
        self
    }

    /// Set the directory where CSL style files are cached
    pub fn with_style_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.style_dir = dir.into();
        self
    }

    /// Enable the diagnostic trace, writing stage files under `dir`
    pub fn with_trace_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.trace_dir = Some(dir.into());
        self
    }

    /// Get the effective PubMed base URL
    pub fn effective_pubmed_base_url(&self) -> &str {
        self.pubmed_base_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBMED_BASE_URL)
    }

    /// Get the effective arXiv base URL
    pub fn effective_arxiv_base_url(&self) -> &str {
        self.arxiv_base_url
            .as_deref()
            .unwrap_or(DEFAULT_ARXIV_BASE_URL)
    }

    /// Get the effective bioRxiv base URL
    pub fn effective_biorxiv_base_url(&self) -> &str {
        self.biorxiv_base_url
            .as_deref()
            .unwrap_or(DEFAULT_BIORXIV_BASE_URL)
    }

    /// Get the effective CSL styles base URL
    pub fn effective_styles_base_url(&self) -> &str {
        self.styles_base_url
            .as_deref()
            .unwrap_or(DEFAULT_STYLES_BASE_URL)
    }

    /// Get the effective User-Agent header value
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("citegen/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Build the shared HTTP client from this configuration
    pub fn create_http_client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.effective_user_agent())
            .build()
            .expect("Failed to create HTTP client")
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
