use thiserror::Error;

/// Error types for citation generation operations
#[derive(Error, Debug)]
pub enum CitationError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// XML parsing failed
    #[error("XML parsing failed: {0}")]
    XmlError(String),

    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// No usable record for the given identifier
    ///
    /// The field is named `origin` rather than `source` because thiserror
    /// reserves `source` for the error-chain cause.
    #[error("Record not found: {origin} id {id}")]
    RecordNotFound { origin: &'static str, id: String },

    /// CSL style could not be resolved locally or remotely
    #[error("Style '{style}' could not be resolved")]
    StyleNotFound { style: String },

    /// The CSL renderer failed or produced unusable output
    #[error("{message}")]
    RenderError { message: String },

    /// Generic upstream API error
    #[error("API error: {message}")]
    ApiError { message: String },
}

pub type Result<T> = std::result::Result<T, CitationError>;
