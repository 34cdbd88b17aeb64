//! Async API for non-blocking extraction.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! sanction-notice = { version = "0.1", features = ["async"] }
//! ```
//!
//! Extraction is CPU-bound; every call here runs on Tokio's blocking pool.

use crate::error::{Error, Result};
use crate::model::SanctionDocument;
use crate::render::RenderOptions;
use crate::source::{is_ocr_path, ExtractedText, PlainTextSource, TextSource};
use crate::{ExtractOptions, Extractor};
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};

fn join_error(e: tokio::task::JoinError) -> Error {
    Error::Io(std::io::Error::other(e.to_string()))
}

/// Asynchronously extracts a document from text.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> sanction_notice::Result<()> {
/// let document = sanction_notice::async_api::extract_text("1. 금융기관명 : 갑".to_string()).await?;
/// assert_eq!(document.institution, "갑");
/// # Ok(())
/// # }
/// ```
pub async fn extract_text(text: String) -> Result<SanctionDocument> {
    tokio::task::spawn_blocking(move || crate::extract_document(&text))
        .await
        .map_err(join_error)
}

/// Asynchronously extracts a document from a UTF-8 text file.
pub async fn extract_file(path: impl AsRef<Path>) -> Result<SanctionDocument> {
    AsyncExtractor::new().extract_file(path).await
}

/// Asynchronously extracts a document from an async reader.
pub async fn extract_reader<R: AsyncRead + Unpin>(mut reader: R) -> Result<SanctionDocument> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).await?;
    let extracted = PlainTextSource::new().extract(&data)?;
    AsyncExtractor::new().extract(extracted).await
}

/// Asynchronously renders a file's document to Markdown.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> sanction_notice::Result<()> {
/// use sanction_notice::RenderOptions;
///
/// let markdown = sanction_notice::async_api::to_markdown("notice.txt", &RenderOptions::default()).await?;
/// tokio::fs::write("notice.md", markdown).await?;
/// # Ok(())
/// # }
/// ```
pub async fn to_markdown(path: impl AsRef<Path>, options: &RenderOptions) -> Result<String> {
    let document = extract_file(path).await?;
    let options = options.clone();
    tokio::task::spawn_blocking(move || crate::render::render_markdown(&document, &options))
        .await
        .map_err(join_error)
}

/// Async counterpart of [`Extractor`].
///
/// # Example
///
/// ```no_run
/// # async fn example() -> sanction_notice::Result<()> {
/// use sanction_notice::async_api::AsyncExtractor;
///
/// let documents = AsyncExtractor::new()
///     .with_threads(4)
///     .extract_batch(vec!["1. 금융기관명 : 갑".to_string()])
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AsyncExtractor {
    inner: Extractor,
}

impl AsyncExtractor {
    /// Creates a new async extractor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an async extractor from options.
    pub fn with_options(options: ExtractOptions) -> Self {
        Self {
            inner: Extractor::with_options(options),
        }
    }

    /// Tags every extracted document as OCR output.
    pub fn ocr(mut self) -> Self {
        self.inner = self.inner.ocr();
        self
    }

    /// Parses text as given, without normalization.
    pub fn without_normalization(mut self) -> Self {
        self.inner = self.inner.without_normalization();
        self
    }

    /// Runs batches on a dedicated pool with this many threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.inner = self.inner.with_threads(threads);
        self
    }

    /// Extracts source text on the blocking pool.
    pub async fn extract(&self, extracted: ExtractedText) -> Result<SanctionDocument> {
        let extractor = self.inner.clone();
        tokio::task::spawn_blocking(move || extractor.extract_text(&extracted))
            .await
            .map_err(join_error)
    }

    /// Reads a file with Tokio and extracts it on the blocking pool.
    pub async fn extract_file(&self, path: impl AsRef<Path>) -> Result<SanctionDocument> {
        let path = path.as_ref();
        let data = fs::read(path).await?;
        let source = PlainTextSource {
            assume_ocr: self.inner.options().source.is_ocr() || is_ocr_path(path),
        };
        let extracted = source.extract(&data)?;
        self.extract(extracted).await
    }

    /// Extracts a batch on the blocking pool. Results keep the input order.
    pub async fn extract_batch(&self, texts: Vec<String>) -> Result<Vec<SanctionDocument>> {
        let extractor = self.inner.clone();
        tokio::task::spawn_blocking(move || extractor.extract_batch(&texts))
            .await
            .map_err(join_error)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceMethod;

    #[tokio::test]
    async fn test_extract_text() {
        let document = extract_text("1. 금융기관명 : 갑\n2. 제재조치일 : 2024.1.5".to_string())
            .await
            .unwrap();
        assert_eq!(document.institution, "갑");
        assert_eq!(document.sanction_date, "2024-01-05");
    }

    #[tokio::test]
    async fn test_extract_file_ocr_naming() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notice.ocr.txt");
        std::fs::write(&path, "1. 금융기관명 : 을").unwrap();

        let document = extract_file(&path).await.unwrap();
        assert_eq!(document.institution, "을");
        assert_eq!(document.source, SourceMethod::Ocr);
    }

    #[tokio::test]
    async fn test_extract_reader() {
        let document = extract_reader("1. 금융기관명 : 병".as_bytes()).await.unwrap();
        assert_eq!(document.institution, "병");
    }

    #[tokio::test]
    async fn test_batch_order() {
        let texts = (0..8).map(|i| format!("1. 금융기관명 : 회사{}", i)).collect();
        let documents = AsyncExtractor::new().with_threads(2).extract_batch(texts).await.unwrap();
        assert_eq!(documents.len(), 8);
        assert_eq!(documents[7].institution, "회사7");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = extract_file("/nonexistent/notice.txt").await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
