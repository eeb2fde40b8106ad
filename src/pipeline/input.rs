//! Input handling: the uploaded document as the pipeline receives it.
//!
//! The core only ever sees bytes plus a declared filename. Reading from a
//! local path or stdin is offered for the CLI; staging uploads on disk is
//! left to whichever transport layer needs it.

use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Filename used when a document arrives without one (e.g. from stdin).
pub const DEFAULT_FILENAME: &str = "upload.pdf";

/// PDF readers accept the `%PDF-` header anywhere in the first 1 KiB.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// One uploaded document: its bytes and declared filename.
///
/// Owned by a single inference call and dropped once text has been
/// extracted from it.
#[derive(Clone)]
pub struct RawDocument {
    filename: String,
    bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let filename = filename.into();
        Self {
            filename: if filename.is_empty() {
                DEFAULT_FILENAME.to_string()
            } else {
                filename
            },
            bytes: bytes.into(),
        }
    }

    /// Read a local file into memory.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(Self::new(filename, bytes))
    }

    /// Drain a reader (typically stdin) into memory.
    pub fn from_reader(filename: impl Into<String>, mut reader: impl Read) -> io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::new(filename, bytes))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when a `%PDF-` header appears near the start of the bytes.
    pub fn has_pdf_header(&self) -> bool {
        has_pdf_header(&self.bytes)
    }
}

impl std::fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawDocument")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Check for the `%PDF-` magic within the header search window.
pub fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

/// Check if the CLI input argument means "read stdin".
pub fn is_stdin(input: &str) -> bool {
    input == "-"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_stdin() {
        assert!(is_stdin("-"));
        assert!(!is_stdin("report.pdf"));
        assert!(!is_stdin(""));
    }

    #[test]
    fn test_pdf_header_detection() {
        assert!(has_pdf_header(b"%PDF-1.7\n%..."));
        assert!(has_pdf_header(b"\xEF\xBB\xBF  %PDF-1.4"));
        assert!(!has_pdf_header(b"x"));
        assert!(!has_pdf_header(b""));
        assert!(!has_pdf_header(b"PK\x03\x04 not a pdf"));

        let mut late = vec![b' '; HEADER_SEARCH_WINDOW];
        late.extend_from_slice(b"%PDF-1.4");
        assert!(!has_pdf_header(&late));
    }

    #[test]
    fn test_empty_filename_gets_default() {
        let doc = RawDocument::new("", vec![1u8]);
        assert_eq!(doc.filename(), DEFAULT_FILENAME);
        assert_eq!(doc.len(), 1);
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_from_reader() {
        let doc = RawDocument::from_reader("memo.pdf", &b"%PDF-1.4"[..]).unwrap();
        assert_eq!(doc.filename(), "memo.pdf");
        assert!(doc.has_pdf_header());
    }
}
