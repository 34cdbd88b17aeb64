//! Output forms of an extracted document.
//!
//! Besides the JSON record built by [`SanctionDocument::to_record`], a
//! document can be flattened into one row per incident, rendered as a
//! Markdown report, or checked for suspicious values.

mod markdown;
mod options;

pub use markdown::MarkdownRenderer;
pub use options::RenderOptions;

use crate::error::Result;
use crate::model::{
    or_sentinel, PositionalIncidents, SanctionDocument, OCR_FAILURE_MARKER, SENTINEL,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Sanction contents up to this many characters are suspicious.
const SHORT_CONTENT_MAX_CHARS: usize = 5;

/// Short contents that are legitimate.
const SHORT_CONTENT_ALLOWED: &[&str] = &[SENTINEL, "조치생략"];

/// Renders a document to Markdown.
pub fn render_markdown(document: &SanctionDocument, options: &RenderOptions) -> String {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(document)
}

/// Renders a document to Markdown and writes to a file.
pub fn render_to_file(
    document: &SanctionDocument,
    path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<()> {
    let content = render_markdown(document, options);
    std::fs::write(path, content)?;
    Ok(())
}

/// Renders a document to Markdown and writes to a writer.
pub fn render_to_writer<W: Write>(
    document: &SanctionDocument,
    writer: &mut W,
    options: &RenderOptions,
) -> Result<()> {
    let content = render_markdown(document, options);
    writer.write_all(content.as_bytes())?;
    Ok(())
}

// ============================================================================
// Row output
// ============================================================================

/// One incident of a document, repeated with the document's header fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanctionRow {
    /// Sanctioned institution, or `"-"`
    #[serde(rename = "금융회사명")]
    pub institution: String,
    /// Sanction date, or `"-"`
    #[serde(rename = "제재조치일")]
    pub sanction_date: String,
    /// Pipe-joined subjects, or `"-"`
    #[serde(rename = "제재대상")]
    pub subjects: String,
    /// `" | "`-joined sanction contents, or `"-"`
    #[serde(rename = "제재내용")]
    pub sanctions: String,
    /// Incident title
    #[serde(rename = "제목")]
    pub title: String,
    /// Incident body
    #[serde(rename = "내용")]
    pub body: String,
}

/// Expands a document into one row per incident.
///
/// A document without incidents yields a single row with `"-"` title and
/// body, so every document appears in the output.
pub fn rows(document: &SanctionDocument) -> Vec<SanctionRow> {
    let row = |title: String, body: String| SanctionRow {
        institution: or_sentinel(document.institution.clone()),
        sanction_date: or_sentinel(document.sanction_date.clone()),
        subjects: document.subjects_field(),
        sanctions: document.sanctions_field(),
        title,
        body,
    };

    if document.incidents.is_empty() {
        return vec![row(SENTINEL.to_string(), SENTINEL.to_string())];
    }

    document
        .incidents
        .iter()
        .map(|incident| {
            row(
                or_sentinel(incident.title.clone()),
                or_sentinel(incident.body.clone()),
            )
        })
        .collect()
}

/// Incidents as the positional `제목N`/`내용N` map.
pub fn positional_incidents(document: &SanctionDocument) -> PositionalIncidents {
    PositionalIncidents(document.incidents.clone())
}

// ============================================================================
// Quality report
// ============================================================================

/// A suspicious value in an extracted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QualityIssue {
    /// A table cell was unreadable and needs reprocessing
    OcrFailure,
    /// Sanction content is too short to be a real sanction
    ShortContent(String),
}

impl std::fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityIssue::OcrFailure => write!(f, "{} (재처리 필요)", OCR_FAILURE_MARKER),
            QualityIssue::ShortContent(content) => write!(f, "제재내용이 너무 짧음: {}", content),
        }
    }
}

/// Missing fields and suspicious values of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    /// Record fields that fell back to `"-"`
    pub missing_fields: Vec<&'static str>,
    /// Suspicious sanction contents
    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    /// Returns true if nothing was flagged.
    pub fn is_clean(&self) -> bool {
        self.missing_fields.is_empty() && self.issues.is_empty()
    }
}

/// Checks a document for missing fields and suspicious sanction content.
///
/// Contents are only checked when the document has a subject or a sanction.
/// An unreadable-cell marker is flagged for reprocessing; any other content
/// of five characters or fewer is flagged as too short, except `-` and
/// `조치생략`.
pub fn quality_report(document: &SanctionDocument) -> QualityReport {
    let mut report = QualityReport {
        missing_fields: document.missing_fields(),
        issues: Vec::new(),
    };

    let subjects = document.subjects_field();
    let sanctions = document.sanctions_field();
    if subjects == SENTINEL && sanctions == SENTINEL {
        return report;
    }

    if document.pairs.iter().any(|p| p.content.trim() == OCR_FAILURE_MARKER) {
        report.issues.push(QualityIssue::OcrFailure);
    } else if sanctions.chars().count() <= SHORT_CONTENT_MAX_CHARS
        && !SHORT_CONTENT_ALLOWED.contains(&sanctions.as_str())
    {
        report.issues.push(QualityIssue::ShortContent(sanctions));
    }

    if !report.issues.is_empty() {
        tracing::debug!(issues = report.issues.len(), "quality issues found");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Incident, TargetSanction};

    fn document(pairs: Vec<TargetSanction>, incidents: Vec<Incident>) -> SanctionDocument {
        SanctionDocument {
            institution: "테스트은행".into(),
            sanction_date: "2024-05-15".into(),
            pairs,
            incidents,
            ..SanctionDocument::default()
        }
    }

    #[test]
    fn test_rows_one_per_incident() {
        let doc = document(
            vec![TargetSanction::new("기관", "기관경고")],
            vec![Incident::new("첫째", "본문"), Incident::new("둘째", "")],
        );
        let rows = rows(&doc);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "첫째");
        assert_eq!(rows[1].body, "-");
        assert!(rows.iter().all(|r| r.institution == "테스트은행" && r.subjects == "기관"));
    }

    #[test]
    fn test_rows_without_incidents() {
        let rows = rows(&SanctionDocument::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].institution, "-");
        assert_eq!(rows[0].title, "-");

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["제목"], "-");
        assert_eq!(json["제재내용"], "-");
    }

    #[test]
    fn test_positional_incidents() {
        let doc = document(Vec::new(), vec![Incident::new("제목", "본문")]);
        let entries = positional_incidents(&doc).entries();
        assert_eq!(entries[0], ("제목1".to_string(), "제목".to_string()));
        assert_eq!(entries[1], ("내용1".to_string(), "본문".to_string()));
    }

    #[test]
    fn test_quality_clean() {
        let doc = document(
            vec![TargetSanction::new("기관", "기관경고, 과태료 1억원")],
            vec![Incident::new("제목", "본문")],
        );
        assert!(quality_report(&doc).is_clean());
    }

    #[test]
    fn test_quality_flags_ocr_failure() {
        let doc = document(vec![TargetSanction::new("직원", OCR_FAILURE_MARKER)], Vec::new());
        let report = quality_report(&doc);
        assert_eq!(report.issues, vec![QualityIssue::OcrFailure]);
        assert_eq!(report.issues[0].to_string(), "OCR 오류로 추출 실패 (재처리 필요)");
        assert_eq!(report.missing_fields, vec!["제목", "내용"]);
    }

    #[test]
    fn test_quality_flags_short_content() {
        let doc = document(vec![TargetSanction::new("직원", "견책")], Vec::new());
        assert_eq!(
            quality_report(&doc).issues,
            vec![QualityIssue::ShortContent("견책".into())]
        );

        let doc = document(vec![TargetSanction::new("기관", "조치생략")], Vec::new());
        assert!(quality_report(&doc).issues.is_empty());
    }

    #[test]
    fn test_quality_skips_empty_pairs() {
        let report = quality_report(&SanctionDocument::default());
        assert!(report.issues.is_empty());
        assert_eq!(report.missing_fields.len(), 6);
    }

    #[test]
    fn test_render_to_writer() {
        let doc = document(vec![TargetSanction::new("기관", "기관경고")], Vec::new());
        let mut buffer = Vec::new();
        render_to_writer(&doc, &mut buffer, &RenderOptions::default()).unwrap();
        assert!(String::from_utf8(buffer).unwrap().contains("| 기관 | 기관경고 |"));
    }

    #[test]
    fn test_render_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        let doc = document(Vec::new(), Vec::new());
        render_to_file(&doc, &path, &RenderOptions::default()).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("# 테스트은행"));
    }
}
