//! # sanction-notice
//!
//! Extracts structured records from the text of Korean financial-regulator
//! sanction notices (제재조치 공시).
//!
//! The input is whatever a PDF text layer or an OCR pass produced: spaced-out
//! syllables, page numbers in the middle of sentences, tables flattened into
//! one cell per line. The output is a [`SanctionDocument`] with the sanctioned
//! institution, the sanction date, target/sanction pairs and the incidents of
//! the grounds section.
//!
//! Extraction never fails on text. Anything that cannot be found is left
//! empty and becomes `"-"` in the serialized [`SanctionRecord`]. Errors only
//! come from I/O at the edges (files, thread pools).
//!
//! ## Quick Start
//!
//! ```
//! use sanction_notice::extract_document;
//!
//! let text = "1. 금융기관명 : 테스트은행\n\
//!             2. 제재조치일 : 2024. 5. 15.\n\
//!             3. 제재조치내용\n\
//!             제재대상 제재내용\n\
//!             기관 기관경고\n\
//!             4. 제재대상사실\n\
//!             가. 고객정보 관리 부적정\n\
//!             내부통제기준을 위반하였다.";
//!
//! let document = extract_document(text);
//! assert_eq!(document.institution, "테스트은행");
//! assert_eq!(document.sanction_date, "2024-05-15");
//! assert_eq!(document.pairs[0].content, "기관경고");
//! assert_eq!(document.incidents[0].title, "고객정보 관리 부적정");
//! ```
//!
//! ## Features
//!
//! - `async`: Tokio wrappers that run extraction on the blocking pool

pub mod alias;
pub mod cascade;
pub mod classify;
pub mod error;
pub mod extract_options;
pub mod incident;
pub mod metadata;
pub mod model;
pub mod normalize;
pub mod outline;
pub mod pairs;
pub mod render;
pub mod section;
pub mod source;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use classify::{assess, is_tabular, ClassifierConfig, FormatAssessment};
pub use error::{Error, Result};
pub use extract_options::ExtractOptions;
pub use incident::extract_incidents;
pub use metadata::extract_metadata;
pub use model::{
    Incident, Layout, Metadata, SanctionDocument, SanctionRecord, SourceMethod, TargetSanction,
};
pub use normalize::{normalize, normalize_with, NormalizeOptions};
pub use pairs::{extract_pairs, extract_sanction_details};
pub use render::{quality_report, QualityReport, RenderOptions};
pub use source::{ExtractedText, PlainTextSource, TextSource};

use rayon::prelude::*;
use std::path::Path;

/// Extracts a document from text with default options.
pub fn extract_document(text: &str) -> SanctionDocument {
    extract_document_with(text, &ExtractOptions::default())
}

/// Extracts a document from text.
///
/// Text starting with `[` is a failure marker left by an upstream stage and
/// yields an empty document.
pub fn extract_document_with(text: &str, options: &ExtractOptions) -> SanctionDocument {
    if source::is_failure_marker(text) {
        tracing::debug!("failure marker, skipping extraction");
        return SanctionDocument::empty(options.source);
    }

    let text = if options.normalize {
        normalize_with(text, &options.normalize_options)
    } else {
        text.to_string()
    };

    let metadata = extract_metadata(&text);
    let layout = sanction_layout(&text);
    let pairs = extract_pairs(&text);
    let incidents = extract_incidents(&text);
    let sanction_details = extract_sanction_details(&text);

    tracing::debug!(
        institution = %metadata.institution,
        pairs = pairs.len(),
        incidents = incidents.len(),
        %layout,
        "document extracted"
    );

    SanctionDocument {
        institution: metadata.institution,
        sanction_date: metadata.sanction_date,
        pairs,
        incidents,
        layout,
        sanction_details,
        source: options.source,
    }
}

/// Classifies the sanction block of a notice (heading line included), or the
/// whole text when the block heading is missing.
pub fn sanction_layout(text: &str) -> Layout {
    let block = section::sanction_block(text).unwrap_or(text);
    assess(block).layout
}

/// Extracts a document from a UTF-8 text file.
///
/// Files named `*.ocr.txt` are tagged as OCR output.
///
/// # Example
///
/// ```no_run
/// use sanction_notice::extract_file;
///
/// let document = extract_file("notice.txt")?;
/// println!("{}", serde_json::to_string_pretty(&document.to_record()).unwrap());
/// # Ok::<(), sanction_notice::Error>(())
/// ```
pub fn extract_file(path: impl AsRef<Path>) -> Result<SanctionDocument> {
    Extractor::new().extract_file(path)
}

/// Builder for configuring extraction.
///
/// # Example
///
/// ```
/// use sanction_notice::Extractor;
///
/// let documents = Extractor::new()
///     .ocr()
///     .with_threads(2)
///     .extract_batch(&["1. 금융기관명 : 갑", "[OCR 실패]"])?;
///
/// assert_eq!(documents[0].institution, "갑");
/// assert!(documents[1].is_empty());
/// # Ok::<(), sanction_notice::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    options: ExtractOptions,
}

impl Extractor {
    /// Creates an extractor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor from options.
    pub fn with_options(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Tags every extracted document as OCR output.
    pub fn ocr(mut self) -> Self {
        self.options = self.options.ocr();
        self
    }

    /// Parses text as given, without normalization.
    pub fn without_normalization(mut self) -> Self {
        self.options = self.options.without_normalization();
        self
    }

    /// Sets the normalizer stages.
    pub fn with_normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.options = self.options.with_normalize_options(options);
        self
    }

    /// Disables parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Runs batches on a dedicated pool with this many threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.options = self.options.with_threads(threads);
        self
    }

    /// Returns the current options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extracts one document.
    pub fn extract(&self, text: &str) -> SanctionDocument {
        extract_document_with(text, &self.options)
    }

    /// Extracts text obtained from a [`TextSource`], keeping its method.
    pub fn extract_text(&self, extracted: &ExtractedText) -> SanctionDocument {
        let options = self.options.clone().with_source(extracted.method);
        extract_document_with(&extracted.text, &options)
    }

    /// Reads a UTF-8 text file and extracts it.
    ///
    /// A `*.ocr.txt` name tags the document as OCR output even when the
    /// extractor itself is not set to OCR.
    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<SanctionDocument> {
        let path = path.as_ref();
        let source = PlainTextSource {
            assume_ocr: self.options.source == SourceMethod::Ocr || source::is_ocr_path(path),
        };
        let extracted = source::extract_path(&source, path)?;
        Ok(self.extract_text(&extracted))
    }

    /// Extracts many documents. Results keep the input order.
    pub fn extract_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<Vec<SanctionDocument>> {
        self.run_batch(texts, |text| self.extract(text.as_ref()))
    }

    /// Extracts many files. Each file succeeds or fails on its own; the outer
    /// error is only returned when the thread pool cannot be built.
    pub fn extract_files<P: AsRef<Path> + Sync>(
        &self,
        paths: &[P],
    ) -> Result<Vec<Result<SanctionDocument>>> {
        self.extract_files_with(paths, |_, _| {})
    }

    /// Like [`Extractor::extract_files`], calling `on_done` as each file
    /// finishes (in completion order).
    pub fn extract_files_with<P, F>(
        &self,
        paths: &[P],
        on_done: F,
    ) -> Result<Vec<Result<SanctionDocument>>>
    where
        P: AsRef<Path> + Sync,
        F: Fn(&Path, &Result<SanctionDocument>) + Sync,
    {
        self.run_batch(paths, |path| {
            let path = path.as_ref();
            let result = self.extract_file(path);
            if let Err(ref e) = result {
                tracing::debug!(path = %path.display(), error = %e, "file extraction failed");
            }
            on_done(path, &result);
            result
        })
    }

    fn run_batch<I, T, F>(&self, items: &[I], f: F) -> Result<Vec<T>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> T + Sync,
    {
        if !self.options.parallel || items.len() < 2 {
            return Ok(items.iter().map(f).collect());
        }

        match self.options.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
                tracing::debug!(threads, items = items.len(), "batch on dedicated pool");
                Ok(pool.install(|| items.par_iter().map(&f).collect()))
            }
            None => Ok(items.par_iter().map(&f).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const NOTICE: &str = "금융감독원\n\
제재내용 공개\n\
1. 금 융 기 관 명 : 주식회사 테스트은행\n\
2. 제재조치일 : 2024. 5. 15.\n\
3. 제재조치내용\n\
제재대상 제재내용\n\
기관\n\
기관경고\n\
과태료 1억 2천만원\n\
임원\n\
주의 1명\n\
직원\n\
견책 2명\n\
- 1 -\n\
4. 제재대상사실\n\
가. 고객정보 관리 부적정\n\
(1) 신용정보 조회 기록 미보관\n\
테스트은행은 신용정보 조회 기록을 보관하지 아니하였다.\n\
(2) 개인정보 접근권한 관리 소홀\n\
접근권한을 부여하면서 승인절차를 거치지 아니하였다.\n\
- 2 -\n\
나. 보고의무 위반\n\
정기보고서를 기한 내에 제출하지 아니하였다.\n";

    #[test]
    fn test_end_to_end_tabular_notice() {
        let document = extract_document(NOTICE);

        assert_eq!(document.institution, "주식회사 테스트은행");
        assert_eq!(document.sanction_date, "2024-05-15");
        assert_eq!(document.layout, Layout::Tabular);
        assert_eq!(
            document.pairs,
            vec![
                TargetSanction::new("기관", "기관경고, 과태료 1억 2천만원"),
                TargetSanction::new("임원", "주의 1명"),
                TargetSanction::new("직원", "견책 2명"),
            ]
        );

        let titles: Vec<&str> = document.incidents.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "고객정보 관리 부적정 - 신용정보 조회 기록 미보관",
                "고객정보 관리 부적정 - 개인정보 접근권한 관리 소홀",
                "보고의무 위반",
            ]
        );
        assert_eq!(
            document.incidents[1].body,
            "접근권한을 부여하면서 승인절차를 거치지 아니하였다."
        );
        assert!(document.sanction_details.starts_with("기관\n기관경고"));
    }

    #[test]
    fn test_end_to_end_record() {
        let record = extract_document(NOTICE).to_record();
        assert_eq!(record.subjects, "기관|임원|직원");
        assert_eq!(record.sanctions, "기관경고, 과태료 1억 2천만원 | 주의 1명 | 견책 2명");
        assert_eq!(record.missing_fields, "-");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["제목3"], "보고의무 위반");
    }

    #[test]
    fn test_dash_spaced_date_survives_normalization() {
        let document = extract_document("1. 금융기관명 : 테스트은행\n2. 제재조치일 : 2024 - 5 - 15\n");
        assert_eq!(document.institution, "테스트은행");
        assert_eq!(document.sanction_date, "2024-05-15");
    }

    #[test]
    fn test_layout_scores_sanction_heading() {
        let text = "1. 금융기관명 : 갑\n3. 제재조치내용\n제재대상 제재내용\n임원\n주의 1명\n4. 제재대상사실\n가. 위반";

        let block = section::sanction_block(text).unwrap();
        let assessment = assess(block);
        assert!(assessment.signals.contains(&classify::Signal::SectionHeader));
        assert_eq!(sanction_layout(text), Layout::Tabular);

        let document = extract_document(text);
        assert_eq!(document.pairs, vec![TargetSanction::new("임원", "주의 1명")]);
    }

    #[test]
    fn test_empty_text_yields_sentinel_record() {
        let document = extract_document("");
        assert!(document.is_empty());

        let record = document.to_record();
        assert_eq!(record.institution, "-");
        assert_eq!(record.subjects, "-");
        assert_eq!(record.incidents.entries()[0], ("제목1".to_string(), "-".to_string()));
    }

    #[test]
    fn test_failure_marker_fast_fails() {
        let document = extract_document_with("[OCR 실패] 1. 금융기관명 : 갑", &ExtractOptions::new().ocr());
        assert!(document.is_empty());
        assert_eq!(document.source, SourceMethod::Ocr);
        assert!(extract_pairs("[x]").is_empty());
        assert!(extract_incidents("[x]\n가. 제목").is_empty());
        assert_eq!(extract_metadata("[x]"), Metadata::default());
    }

    #[test]
    fn test_without_normalization_keeps_raw_text() {
        let text = "3. 제재조치내용\n제재대상 제재내용\n기관 견무정지 1월\n4. 제재대상사실";

        let normalized = extract_document(text);
        assert_eq!(normalized.sanction_details, "기관 업무정지 1월");

        let raw = Extractor::new().without_normalization().extract(text);
        assert_eq!(raw.sanction_details, "기관 견무정지 1월");
    }

    #[test]
    fn test_total_on_random_input() {
        let mut rng = StdRng::seed_from_u64(0x5A4C);
        let alphabet: Vec<char> = "가나다라기관임원직원제재조치내용사실 \n\t-_|()[]:.0123456789□○◦·가.(1)(가)"
            .chars()
            .collect();

        for _ in 0..300 {
            let len = rng.gen_range(0..200);
            let text: String = (0..len)
                .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
                .collect();

            let document = extract_document(&text);
            let _ = document.to_record();
            let _ = normalize(&text);
            let _ = is_tabular(&text);
            let _ = extract_pairs(&text);
            let _ = extract_incidents(&text);
            let _ = extract_metadata(&text);
            let _ = extract_sanction_details(&text);
            let _ = quality_report(&document);
        }
    }

    #[test]
    fn test_batch_preserves_order() {
        let texts: Vec<String> = (0..16)
            .map(|i| format!("1. 금융기관명 : 기관{}\n2. 제재조치일 : 2024.1.{}", i, i + 1))
            .collect();

        let parallel = Extractor::new().with_threads(4).extract_batch(&texts).unwrap();
        let sequential = Extractor::new().sequential().extract_batch(&texts).unwrap();

        assert_eq!(parallel, sequential);
        for (i, document) in parallel.iter().enumerate() {
            assert_eq!(document.institution, format!("기관{}", i));
        }
    }

    #[test]
    fn test_extract_file_and_ocr_naming() {
        let dir = tempfile::tempdir().unwrap();
        let text_path = dir.path().join("0001.txt");
        let ocr_path = dir.path().join("0002.ocr.txt");
        std::fs::write(&text_path, "1. 금융기관명 : 갑").unwrap();
        std::fs::write(&ocr_path, "1. 금융기관명 : 을").unwrap();

        let document = extract_file(&text_path).unwrap();
        assert_eq!(document.institution, "갑");
        assert_eq!(document.source, SourceMethod::Text);

        let document = extract_file(&ocr_path).unwrap();
        assert_eq!(document.source, SourceMethod::Ocr);
    }

    #[test]
    fn test_extract_files_reports_each_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.txt");
        std::fs::write(&good, "1. 금융기관명 : 갑").unwrap();
        let missing = dir.path().join("missing.txt");

        let seen = std::sync::atomic::AtomicUsize::new(0);
        let results = Extractor::new()
            .extract_files_with(&[good, missing], |_, _| {
                seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            })
            .unwrap();

        assert_eq!(seen.into_inner(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::Io(_))));
    }

    #[test]
    fn test_extract_text_keeps_source_method() {
        let extracted = ExtractedText::new("1. 금융기관명 : 갑", SourceMethod::Ocr);
        let document = Extractor::new().extract_text(&extracted);
        assert_eq!(document.source, SourceMethod::Ocr);
    }
}
