//! Text extraction: read the text layer of every page with lopdf.
//!
//! Pages are processed in page order and their text concatenated. A page
//! whose content cannot be decoded is skipped with a warning and counts as
//! failed; the rest of the document still contributes. A page that panics
//! inside the parser is treated the same way.

use lopdf::Document;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, warn};

/// Non-empty text recovered from a PDF.
///
/// The only constructor rejects whitespace-only input, so holding one
/// means there is something to normalise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// Wrap `text`, or return `None` if it is empty after trimming.
    pub fn new(text: String) -> Option<Self> {
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Page counters for one extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageReport {
    pub pages_total: usize,
    pub pages_failed: usize,
}

/// What a successfully parsed PDF yielded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Text {
        text: ExtractedText,
        report: PageReport,
    },
    /// The PDF parsed, but no page produced non-whitespace text.
    NoText { report: PageReport },
}

/// The bytes are not a PDF lopdf can open.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct MalformedPdf(pub String);

/// Basic facts about a PDF, without extracting its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub pdf_version: String,
    pub is_encrypted: bool,
}

/// Extract the concatenated text of every page, in page order.
pub fn extract_text(bytes: &[u8]) -> Result<ExtractionOutcome, MalformedPdf> {
    let document = load(bytes)?;
    let pages = document.get_pages();
    Ok(collect_pages(pages.keys().copied(), |page_number| {
        extract_page(&document, page_number)
    }))
}

/// Run `extract` over every page number, skipping and counting failures.
fn collect_pages<I, F>(pages: I, mut extract: F) -> ExtractionOutcome
where
    I: IntoIterator<Item = u32>,
    F: FnMut(u32) -> Result<String, String>,
{
    let mut report = PageReport::default();
    let mut text = String::new();

    for page_number in pages {
        report.pages_total += 1;
        match extract(page_number) {
            Ok(page_text) => {
                debug!("Page {}: {} chars", page_number, page_text.len());
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(detail) => {
                warn!("Skipping page {}: {}", page_number, detail);
                report.pages_failed += 1;
            }
        }
    }

    match ExtractedText::new(text) {
        Some(text) => ExtractionOutcome::Text { text, report },
        None => ExtractionOutcome::NoText { report },
    }
}

/// Read page count and version without touching page content.
pub fn inspect(bytes: &[u8]) -> Result<DocumentInfo, MalformedPdf> {
    let document = load(bytes)?;
    Ok(DocumentInfo {
        page_count: document.get_pages().len(),
        pdf_version: document.version.clone(),
        is_encrypted: document.is_encrypted(),
    })
}

fn load(bytes: &[u8]) -> Result<Document, MalformedPdf> {
    let document = panic::catch_unwind(|| Document::load_mem(bytes))
        .map_err(|_| MalformedPdf("parser panicked while reading the document".to_string()))?
        .map_err(|e| MalformedPdf(e.to_string()))?;
    if document.is_encrypted() {
        debug!("PDF is encrypted; extraction may yield no text");
    }
    Ok(document)
}

fn extract_page(document: &Document, page_number: u32) -> Result<String, String> {
    panic::catch_unwind(AssertUnwindSafe(|| document.extract_text(&[page_number])))
        .map_err(|_| "parser panicked".to_string())?
        .map_err(|e| e.to_string())
}
