//! Result types returned by the inference entry points.

use crate::error::{ErrorKind, RequestError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of labels a prediction can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "Annual Report")]
    AnnualReport,
    #[serde(rename = "Non-Annual Report")]
    NonAnnualReport,
    /// The classifier emitted a code outside `{0, 1}`.
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Label {
    /// Map a classifier class code through the fixed label table.
    pub fn from_class_code(code: i64) -> Self {
        match code {
            0 => Label::NonAnnualReport,
            1 => Label::AnnualReport,
            _ => Label::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::AnnualReport => "Annual Report",
            Label::NonAnnualReport => "Non-Annual Report",
            Label::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters collected while one document moved through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Pages in the PDF.
    pub pages_total: usize,
    /// Pages whose text could not be extracted and were skipped.
    pub pages_failed: usize,
    /// Characters of extracted text, before normalisation.
    pub extracted_chars: usize,
    /// Tokens left after normalisation.
    pub tokens: usize,
    /// Tokens found in the embedding vocabulary.
    pub tokens_in_vocabulary: usize,
    /// Wall-clock time for the whole call, in milliseconds.
    pub duration_ms: u64,
}

/// A successful classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    /// Raw code returned by the classifier before label mapping.
    pub class_code: i64,
    pub stats: PipelineStats,
}

/// Outcome of one inference call.
pub type PredictionResult = Result<Prediction, RequestError>;

/// The envelope handed to the transport layer.
///
/// Serialises as `{"label": "..."}` or `{"error": "<ErrorKind>", "detail": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InferenceResponse {
    Label {
        label: Label,
    },
    Error {
        error: ErrorKind,
        detail: String,
    },
}

impl InferenceResponse {
    /// Build an error envelope carrying only the kind's safe message.
    pub fn from_kind(kind: ErrorKind) -> Self {
        InferenceResponse::Error {
            error: kind,
            detail: kind.client_message().to_string(),
        }
    }

    /// Status code the transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            InferenceResponse::Label { .. } => 200,
            InferenceResponse::Error { error, .. } => error.status_code(),
        }
    }
}

impl From<&PredictionResult> for InferenceResponse {
    fn from(result: &PredictionResult) -> Self {
        match result {
            Ok(prediction) => InferenceResponse::Label {
                label: prediction.label,
            },
            Err(e) => InferenceResponse::from_kind(e.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_codes_map_through_label_table() {
        assert_eq!(Label::from_class_code(0), Label::NonAnnualReport);
        assert_eq!(Label::from_class_code(1), Label::AnnualReport);
        assert_eq!(Label::from_class_code(2), Label::Unknown);
        assert_eq!(Label::from_class_code(-1), Label::Unknown);
    }

    #[test]
    fn label_envelope_json() {
        let r = InferenceResponse::Label {
            label: Label::AnnualReport,
        };
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"{"label":"Annual Report"}"#
        );
        assert_eq!(r.status_code(), 200);
    }

    #[test]
    fn error_envelope_hides_internal_detail() {
        let result: PredictionResult =
            Err(RequestError::Internal("lopdf panicked at xref.rs:42".into()));
        let r = InferenceResponse::from(&result);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"error\":\"InternalError\""), "got: {json}");
        assert!(!json.contains("xref"), "got: {json}");
        assert_eq!(r.status_code(), 500);
    }

    #[test]
    fn no_text_envelope_is_client_error() {
        let result: PredictionResult = Err(RequestError::NoExtractableText {
            filename: "scan.pdf".into(),
            pages: 3,
            failed_pages: 0,
        });
        let r = InferenceResponse::from(&result);
        assert_eq!(r.status_code(), 400);
        assert_eq!(
            r,
            InferenceResponse::Error {
                error: ErrorKind::NoExtractableText,
                detail: "Failed to extract text from PDF".into(),
            }
        );
    }
}
