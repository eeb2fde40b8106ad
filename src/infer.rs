//! Inference entry points: one document in, one label or failure out.
//!
//! ```text
//! Received ──▶ Extracted ──▶ Normalized ──▶ Embedded ──▶ Classified ──▶ Responded
//!    │             │
//!    ▼             ▼
//!  Failed        Failed            (any unexpected error) ──▶ Failed
//! ```
//!
//! Only the first two transitions can fail on a well-formed context:
//! extraction reports `NoFileProvided`, `MalformedDocument` or
//! `NoExtractableText`. Normalisation and embedding always succeed.
//! Anything else becomes `InternalError`.

use crate::context::InferenceContext;
use crate::error::RequestError;
use crate::output::{InferenceResponse, Label, PipelineStats, Prediction, PredictionResult};
use crate::pipeline::extract::{self, DocumentInfo, ExtractionOutcome};
use crate::pipeline::input::RawDocument;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Classify one document.
///
/// The document is consumed; its bytes are released as soon as text has
/// been extracted.
///
/// # Errors
/// - [`RequestError::NoFileProvided`] for a zero-byte document
/// - [`RequestError::MalformedDocument`] when the bytes are not a PDF
/// - [`RequestError::NoExtractableText`] when no page has a text layer
/// - [`RequestError::Internal`] if the classifier rejects the vector
pub fn classify(context: &InferenceContext, document: RawDocument) -> PredictionResult {
    let start = Instant::now();
    debug!(
        "Received '{}' ({} bytes)",
        document.filename(),
        document.len()
    );

    // ── Received → Extracted ─────────────────────────────────────────────
    if document.is_empty() {
        return Err(RequestError::NoFileProvided);
    }
    let filename = document.filename().to_string();
    if !document.has_pdf_header() {
        return Err(RequestError::MalformedDocument {
            filename,
            detail: "missing %PDF- header".into(),
        });
    }

    let outcome = extract::extract_text(document.bytes()).map_err(|e| {
        RequestError::MalformedDocument {
            filename: filename.clone(),
            detail: e.to_string(),
        }
    })?;
    drop(document);

    let (text, report) = match outcome {
        ExtractionOutcome::Text { text, report } => (text, report),
        ExtractionOutcome::NoText { report } => {
            return Err(RequestError::NoExtractableText {
                filename,
                pages: report.pages_total,
                failed_pages: report.pages_failed,
            });
        }
    };
    let extracted_chars = text.as_str().chars().count();

    // ── Extracted → Normalized → Embedded ────────────────────────────────
    let tokens = context.normalizer().normalize(text.as_str());
    let embedding = context.embeddings().embed(&tokens);
    debug!(
        "'{}': {} tokens, {} in vocabulary",
        filename,
        tokens.len(),
        embedding.tokens_in_vocabulary
    );

    // ── Embedded → Classified ────────────────────────────────────────────
    let class_code = context
        .classifier()
        .predict(&embedding.vector)
        .map_err(|e| RequestError::Internal(e.to_string()))?;
    let label = Label::from_class_code(class_code);
    if label == Label::Unknown {
        warn!("Classifier returned unmapped class code {}", class_code);
    }

    let stats = PipelineStats {
        pages_total: report.pages_total,
        pages_failed: report.pages_failed,
        extracted_chars,
        tokens: tokens.len(),
        tokens_in_vocabulary: embedding.tokens_in_vocabulary,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "'{}' → {} ({} pages, {}ms)",
        filename, label, stats.pages_total, stats.duration_ms
    );

    Ok(Prediction {
        label,
        class_code,
        stats,
    })
}

/// Serve one request and build the envelope for the transport layer.
///
/// `None` means the request carried no file at all. Panics inside the
/// pipeline are caught here and reported as `InternalError`; the detail is
/// logged and never returned.
pub fn respond(context: &InferenceContext, upload: Option<RawDocument>) -> InferenceResponse {
    let result = run_guarded(context, upload);
    log_outcome(&result);
    InferenceResponse::from(&result)
}

/// [`classify`] plus panic containment, without building an envelope.
pub fn run_guarded(context: &InferenceContext, upload: Option<RawDocument>) -> PredictionResult {
    let Some(document) = upload else {
        return Err(RequestError::NoFileProvided);
    };
    panic::catch_unwind(AssertUnwindSafe(|| classify(context, document))).unwrap_or_else(|_| {
        Err(RequestError::Internal(
            "inference pipeline panicked".to_string(),
        ))
    })
}

/// Run [`classify`] on the blocking thread pool.
///
/// The pipeline is CPU-bound and has no suspension points, so it is moved
/// off the async worker threads. A panic surfaces as
/// [`RequestError::Internal`].
pub async fn classify_async(
    context: Arc<InferenceContext>,
    document: RawDocument,
) -> PredictionResult {
    tokio::task::spawn_blocking(move || classify(&context, document))
        .await
        .map_err(|e| RequestError::Internal(format!("Inference task panicked: {e}")))?
}

/// Page count and version of a PDF, without classifying it.
///
/// Does not need an [`InferenceContext`].
pub fn inspect(document: &RawDocument) -> Result<DocumentInfo, RequestError> {
    if document.is_empty() {
        return Err(RequestError::NoFileProvided);
    }
    extract::inspect(document.bytes()).map_err(|e| RequestError::MalformedDocument {
        filename: document.filename().to_string(),
        detail: e.to_string(),
    })
}

fn log_outcome(result: &PredictionResult) {
    if let Err(e) = result {
        if e.kind().is_client_error() {
            info!("Request rejected ({}): {}", e.kind(), e);
        } else {
            error!("Request failed ({}): {}", e.kind(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pipeline::classify::{Classifier, ClassifierModel, InputWidthError};
    use crate::pipeline::embed::WordVectors;
    use crate::resources::LanguageResources;
    use std::collections::HashSet;

    fn context() -> InferenceContext {
        let embeddings =
            WordVectors::from_entries(1, vec![("annual", vec![1.0]), ("memo", vec![-1.0])])
                .unwrap();
        let classifier = ClassifierModel::from_json(
            r#"{ "kind": "logistic_regression", "n_features": 1,
                 "coef": [1.0], "intercept": 0.0, "classes": [0, 1] }"#,
        )
        .unwrap();
        let index: HashSet<String> = embeddings.words().map(str::to_string).collect();
        InferenceContext::from_parts(
            LanguageResources::english(),
            index,
            embeddings,
            Box::new(classifier),
        )
        .unwrap()
    }

    /// A classifier whose model state is broken.
    #[derive(Debug)]
    struct PanickingClassifier;

    impl Classifier for PanickingClassifier {
        fn input_dimension(&self) -> usize {
            1
        }

        fn predict(&self, _features: &[f32]) -> Result<i64, InputWidthError> {
            panic!("tree 3 references node 9000");
        }
    }

    fn panicking_context() -> InferenceContext {
        let embeddings = WordVectors::from_entries(1, vec![("annual", vec![1.0])]).unwrap();
        let index: HashSet<String> = embeddings.words().map(str::to_string).collect();
        InferenceContext::from_parts(
            LanguageResources::english(),
            index,
            embeddings,
            Box::new(PanickingClassifier),
        )
        .unwrap()
    }

    /// A one-page PDF whose text layer is `text`.
    fn one_page_pdf(text: &str) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1i64,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn classifies_a_real_pdf() {
        let doc = RawDocument::new("ar.pdf", one_page_pdf("Annual annual report"));
        let prediction = classify(&context(), doc).unwrap();
        assert_eq!(prediction.label, Label::AnnualReport);
        assert_eq!(prediction.stats.tokens_in_vocabulary, 2);
    }

    #[test]
    fn panic_in_pipeline_is_internal_error_with_safe_detail() {
        let ctx = panicking_context();
        let doc = RawDocument::new("ar.pdf", one_page_pdf("Annual report"));

        let r = respond(&ctx, Some(doc));
        assert_eq!(r.status_code(), 500);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(
            json,
            r#"{"error":"InternalError","detail":"Internal error while classifying the document"}"#
        );
        assert!(!json.contains("node 9000"));
    }

    #[test]
    fn panic_in_async_task_is_internal_error() {
        let ctx = Arc::new(panicking_context());
        let doc = RawDocument::new("ar.pdf", one_page_pdf("Annual report"));

        let result = tokio_test::block_on(classify_async(ctx, doc));
        let err = result.as_ref().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalError);

        let r = InferenceResponse::from(&result);
        assert_eq!(r.status_code(), 500);
        assert_eq!(r, InferenceResponse::from_kind(ErrorKind::InternalError));
    }

    #[test]
    fn missing_upload_is_no_file_provided() {
        let r = respond(&context(), None);
        assert_eq!(r, InferenceResponse::from_kind(ErrorKind::NoFileProvided));
    }

    #[test]
    fn zero_bytes_is_no_file_provided() {
        let err = classify(&context(), RawDocument::new("empty.pdf", Vec::new())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoFileProvided);
    }

    #[test]
    fn one_byte_is_malformed() {
        let err = classify(&context(), RawDocument::new("x.pdf", vec![b'x'])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    }

    #[test]
    fn truncated_pdf_is_malformed() {
        let doc = RawDocument::new("cut.pdf", b"%PDF-1.5\n1 0 obj\n<< /Type".to_vec());
        let r = respond(&context(), Some(doc));
        assert_eq!(r.status_code(), 400);
        assert_eq!(r, InferenceResponse::from_kind(ErrorKind::MalformedDocument));
    }

    #[test]
    fn inspect_rejects_empty() {
        let err = inspect(&RawDocument::new("e.pdf", Vec::new())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoFileProvided);
    }

    #[test]
    fn async_path_reports_same_kinds() {
        let ctx = Arc::new(context());
        let result = tokio_test::block_on(classify_async(ctx, RawDocument::new("x.pdf", vec![0])));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::MalformedDocument);
    }
}
