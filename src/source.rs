//! Text sources feeding the extractor.
//!
//! The engine itself works on strings. Getting text out of a PDF (text layer
//! or OCR) happens upstream; this module defines the seam those collaborators
//! plug into and ships a plain-text implementation used by the CLI and tests.

use crate::classify::is_tabular;
use crate::error::{Error, Result};
use crate::model::SourceMethod;
use std::io::Read;
use std::path::Path;

/// UTF-8 byte order mark
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// File name suffix marking OCR output.
const OCR_SUFFIX: &str = ".ocr.txt";

/// A general OCR pass must be this much longer to beat a tabular pass.
const LENGTH_ADVANTAGE: f64 = 1.3;

/// Text obtained from a document and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Document text; may be empty or start with a `[...]` failure marker
    pub text: String,
    /// Text layer or OCR
    pub method: SourceMethod,
}

impl ExtractedText {
    /// Creates extracted text.
    pub fn new(text: impl Into<String>, method: SourceMethod) -> Self {
        Self {
            text: text.into(),
            method,
        }
    }

    /// Returns true if the text came from OCR.
    pub fn is_ocr(&self) -> bool {
        self.method == SourceMethod::Ocr
    }

    /// Returns true if the source reported a failure instead of text.
    pub fn is_failure(&self) -> bool {
        is_failure_marker(&self.text)
    }
}

/// Turns document bytes into text.
pub trait TextSource {
    /// Extracts text from the raw bytes of one document.
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText>;
}

/// Returns true if a source put a `[...]` failure marker in place of text.
pub fn is_failure_marker(text: &str) -> bool {
    text.starts_with('[')
}

/// Returns true if the file name follows the `*.ocr.txt` convention.
pub fn is_ocr_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.to_lowercase().ends_with(OCR_SUFFIX))
}

/// Reads a file through a source.
pub fn extract_path<S: TextSource + ?Sized>(source: &S, path: impl AsRef<Path>) -> Result<ExtractedText> {
    let bytes = std::fs::read(path)?;
    source.extract(&bytes)
}

/// Reads everything from a reader through a source.
pub fn extract_reader<S: TextSource + ?Sized, R: Read>(source: &S, reader: &mut R) -> Result<ExtractedText> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    source.extract(&bytes)
}

/// Source for text that has already been extracted to UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSource {
    /// Tag the text as OCR output
    pub assume_ocr: bool,
}

impl PlainTextSource {
    /// Creates a source tagging its text as a text layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source tagging its text as OCR output.
    pub fn ocr() -> Self {
        Self { assume_ocr: true }
    }
}

impl TextSource for PlainTextSource {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText> {
        let bytes = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);
        let text = std::str::from_utf8(bytes)?;
        Ok(ExtractedText::new(text, SourceMethod::from_ocr_hint(self.assume_ocr)))
    }
}

// ============================================================================
// OCR pass selection
// ============================================================================

/// One of two OCR passes over the same page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrPass {
    /// General-purpose pass, better on prose
    General,
    /// Pass tuned for tables
    TableTuned,
}

impl std::fmt::Display for OcrPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrPass::General => write!(f, "general"),
            OcrPass::TableTuned => write!(f, "table-tuned"),
        }
    }
}

/// Picks the better of a general and a table-tuned OCR pass.
///
/// An empty pass loses. If exactly one pass looks tabular it wins.
/// Otherwise the general pass wins when it is more than 1.3 times longer,
/// then the table-tuned pass when it is tabular, then the general pass.
pub fn select_ocr_candidate(general: &str, table_tuned: &str) -> Result<OcrPass> {
    match (general.trim().is_empty(), table_tuned.trim().is_empty()) {
        (true, true) => {
            return Err(Error::SourceFailure("both OCR passes returned no text".into()));
        }
        (true, false) => return Ok(OcrPass::TableTuned),
        (false, true) => return Ok(OcrPass::General),
        (false, false) => {}
    }

    let general_tabular = is_tabular(general);
    let tuned_tabular = is_tabular(table_tuned);

    let choice = match (general_tabular, tuned_tabular) {
        (false, true) => OcrPass::TableTuned,
        (true, false) => OcrPass::General,
        _ if general.chars().count() as f64 > table_tuned.chars().count() as f64 * LENGTH_ADVANTAGE => {
            OcrPass::General
        }
        (_, true) => OcrPass::TableTuned,
        _ => OcrPass::General,
    };
    tracing::debug!(%choice, general_tabular, tuned_tabular, "OCR pass selected");
    Ok(choice)
}

/// Keeps the selected OCR pass as OCR-tagged text.
pub fn choose_ocr_text(general: String, table_tuned: String) -> Result<ExtractedText> {
    let text = match select_ocr_candidate(&general, &table_tuned)? {
        OcrPass::General => general,
        OcrPass::TableTuned => table_tuned,
    };
    Ok(ExtractedText::new(text, SourceMethod::Ocr))
}
