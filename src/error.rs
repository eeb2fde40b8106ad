//! Error types for the annual-report-classifier library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConfigError`] — **Fatal, startup only**: a model artifact or language
//!   resource is missing, corrupt, or inconsistent with its partner. No
//!   [`crate::InferenceContext`] exists while one of these is outstanding, so
//!   no inference call can be accepted.
//!
//! * [`RequestError`] — **Per request**: something about one uploaded
//!   document prevented a prediction. Each variant reports an [`ErrorKind`]
//!   that the transport layer maps to a status code.
//!
//! Normalisation and embedding have no error type at all: they degrade to an
//! empty token sequence or the zero vector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors raised while loading the inference context.
#[derive(Debug, Error)]
pub enum ConfigError {
    // ── Artifact errors ───────────────────────────────────────────────────
    /// An artifact path does not exist.
    #[error("Model artifact not found: '{path}'")]
    ArtifactNotFound { path: PathBuf },

    /// An artifact exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    ArtifactUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The embedding table is not valid word2vec text or binary data.
    #[error("Embedding model '{path}' is corrupt: {detail}")]
    CorruptEmbedding { path: PathBuf, detail: String },

    /// The classifier artifact is not a valid model description.
    #[error("Classifier model '{path}' is corrupt: {detail}")]
    CorruptClassifier { path: PathBuf, detail: String },

    /// The classifier was trained on vectors of a different width than the
    /// embedding table produces.
    #[error(
        "Classifier expects {classifier_dim}-dimensional input but the embedding model \
produces {embedding_dim} dimensions.\nThe two artifacts were not trained together."
    )]
    DimensionMismatch {
        classifier_dim: usize,
        embedding_dim: usize,
    },

    // ── Language resource errors ──────────────────────────────────────────
    /// A stopword list, exception list, or lemma index is malformed.
    #[error("Language resource '{path}' is invalid: {detail}")]
    InvalidResource { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// The closed taxonomy of failures surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The request carried no document, or a zero-byte one.
    NoFileProvided,
    /// The bytes could not be parsed as a PDF.
    MalformedDocument,
    /// The PDF parsed, but no page yielded non-whitespace text.
    NoExtractableText,
    /// The context could not be loaded; no inference is possible.
    ConfigurationError,
    /// Anything else that went wrong inside the pipeline.
    InternalError,
}

impl ErrorKind {
    /// HTTP-style status code the transport layer should answer with.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::NoFileProvided
            | ErrorKind::MalformedDocument
            | ErrorKind::NoExtractableText => 400,
            ErrorKind::ConfigurationError => 503,
            ErrorKind::InternalError => 500,
        }
    }

    /// True for the kinds caused by the uploaded document itself.
    pub fn is_client_error(self) -> bool {
        self.status_code() == 400
    }

    /// A message that is safe to show to the uploader.
    pub fn client_message(self) -> &'static str {
        match self {
            ErrorKind::NoFileProvided => "No file provided",
            ErrorKind::MalformedDocument => "File is not a readable PDF",
            ErrorKind::NoExtractableText => "Failed to extract text from PDF",
            ErrorKind::ConfigurationError => "Classifier is not available",
            ErrorKind::InternalError => "Internal error while classifying the document",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NoFileProvided => "NoFileProvided",
            ErrorKind::MalformedDocument => "MalformedDocument",
            ErrorKind::NoExtractableText => "NoExtractableText",
            ErrorKind::ConfigurationError => "ConfigurationError",
            ErrorKind::InternalError => "InternalError",
        };
        f.write_str(name)
    }
}

/// A failure while serving one prediction request.
///
/// The `Display` output may contain parser diagnostics and is meant for
/// logs. Use [`RequestError::kind`] and [`ErrorKind::client_message`] for
/// anything that leaves the process.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// No document, or an empty one.
    #[error("No file provided")]
    NoFileProvided,

    /// lopdf rejected the document structure.
    #[error("'{filename}' is not a valid PDF: {detail}")]
    MalformedDocument { filename: String, detail: String },

    /// Every page came back empty or failed.
    #[error("No extractable text in '{filename}' ({pages} pages, {failed_pages} failed)")]
    NoExtractableText {
        filename: String,
        pages: usize,
        failed_pages: usize,
    },

    /// Unexpected failure; `detail` is logged, never returned to the caller.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RequestError {
    /// The taxonomy entry this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::NoFileProvided => ErrorKind::NoFileProvided,
            RequestError::MalformedDocument { .. } => ErrorKind::MalformedDocument,
            RequestError::NoExtractableText { .. } => ErrorKind::NoExtractableText,
            RequestError::Internal(_) => ErrorKind::InternalError,
        }
    }
}
