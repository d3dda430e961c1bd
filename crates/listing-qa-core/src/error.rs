//! Error taxonomy for the analysis pipeline.

use std::path::Path;

use thiserror::Error;

/// Errors that abort the analysis of a single image, or the process at startup.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The image file could not be read or decoded.
    #[error("cannot open image {path}: {source}")]
    ImageLoad {
        /// Path of the offending file.
        path: String,
        /// Underlying I/O or decoding error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The subject classifier could not be initialized.
    #[error("subject classifier unavailable: {0}")]
    ModelUnavailable(String),

    /// The OCR engine is missing or failed. Distinct from "no text found".
    #[error("text extraction failed: {0}")]
    TextExtraction(String),

    /// Any other extractor failure (e.g. an inference error).
    #[error("{stage} extraction failed: {message}")]
    Extraction {
        /// Name of the extractor that failed.
        stage: &'static str,
        /// Failure description.
        message: String,
    },

    /// Invalid extractor or pipeline configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    /// Builds an [`PipelineError::ImageLoad`] for `path`.
    pub fn image_load(
        path: impl AsRef<Path>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ImageLoad {
            path: path.as_ref().to_string_lossy().into_owned(),
            source: source.into(),
        }
    }

    /// Path of the image this error is attributed to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::ImageLoad { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Whether this error must stop the whole run rather than one image.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ModelUnavailable(_) | Self::InvalidConfig(_))
    }
}

/// Failures of the remote reasoning backend.
///
/// These never abort an image: the decision engine folds them into a
/// [`Decision::Failed`](crate::domain::Decision) verdict.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Transport-level failure (DNS, TLS, connection reset...).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The request exceeded its deadline.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// The backend answered without any message content.
    #[error("backend returned an empty response")]
    EmptyResponse,

    /// The content was not a JSON object.
    #[error("invalid JSON from backend: {0}")]
    InvalidJson(String),

    /// The JSON object did not match the verdict schema.
    #[error("verdict schema violation: {0}")]
    Schema(String),
}
