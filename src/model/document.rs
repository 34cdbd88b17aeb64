//! Extracted document structure.

use crate::alias;
use serde::Serialize;

/// Placeholder for fields that could not be extracted.
pub const SENTINEL: &str = "-";

/// Content marker for table cells that OCR reduced to a lone dash.
pub const OCR_FAILURE_MARKER: &str = "OCR 오류로 추출 실패";

/// Structured result of extracting one sanction notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanctionDocument {
    /// Sanctioned institution (empty when not found)
    pub institution: String,
    /// Sanction date, `YYYY-MM-DD` when it could be validated (empty when not found)
    pub sanction_date: String,
    /// Target/sanction pairs, one per distinct subject
    pub pairs: Vec<TargetSanction>,
    /// Incidents of the grounds section in document order
    pub incidents: Vec<Incident>,
    /// Layout of the sanction block
    pub layout: Layout,
    /// Raw rows of the sanction table
    pub sanction_details: String,
    /// How the text was obtained
    pub source: SourceMethod,
}

impl SanctionDocument {
    /// Creates the all-empty record returned for unusable input.
    pub fn empty(source: SourceMethod) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// Returns true if nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.institution.is_empty()
            && self.sanction_date.is_empty()
            && self.pairs.is_empty()
            && self.incidents.is_empty()
            && self.sanction_details.is_empty()
    }

    /// Pipe-joined unique subjects, or `"-"`.
    pub fn subjects_field(&self) -> String {
        or_sentinel(alias::join_subjects(&self.pairs))
    }

    /// `" | "`-joined contents in subject order, or `"-"`.
    pub fn sanctions_field(&self) -> String {
        or_sentinel(alias::join_contents(&self.pairs))
    }

    /// Names of the record fields that fall back to the sentinel.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.institution.is_empty() {
            missing.push(FIELD_INSTITUTION);
        }
        if self.sanction_date.is_empty() {
            missing.push(FIELD_SANCTION_DATE);
        }
        if self.pairs.is_empty() {
            missing.push(FIELD_SUBJECTS);
            missing.push(FIELD_SANCTIONS);
        }
        if self.incidents.is_empty() {
            missing.push(FIELD_TITLE);
            missing.push(FIELD_BODY);
        }
        missing
    }

    /// Flattens the document into its serialized record form.
    pub fn to_record(&self) -> super::SanctionRecord {
        super::SanctionRecord::from_document(self)
    }
}

/// Record field label for the institution.
pub const FIELD_INSTITUTION: &str = "금융회사명";
/// Record field label for the sanction date.
pub const FIELD_SANCTION_DATE: &str = "제재조치일";
/// Record field label for the subjects.
pub const FIELD_SUBJECTS: &str = "제재대상";
/// Record field label for the sanction contents.
pub const FIELD_SANCTIONS: &str = "제재내용";
/// Record field label prefix for incident titles.
pub const FIELD_TITLE: &str = "제목";
/// Record field label prefix for incident bodies.
pub const FIELD_BODY: &str = "내용";

/// Returns `value`, or `"-"` when it is blank.
pub fn or_sentinel(value: String) -> String {
    if value.trim().is_empty() {
        SENTINEL.to_string()
    } else {
        value
    }
}

/// Institution name and sanction date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// Sanctioned institution
    pub institution: String,
    /// Sanction date
    pub sanction_date: String,
}

/// A sanctioned subject and what was imposed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetSanction {
    /// Canonical subject label, e.g. `기관`, `임원|직원`, `보험설계사 등`
    pub subject: String,
    /// Aggregated sanction content
    pub content: String,
}

impl TargetSanction {
    /// Creates a pair.
    pub fn new(subject: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            content: content.into(),
        }
    }
}

/// One factual finding of the grounds section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Incident {
    /// Incident title, composed as `"parent - sub"` for nested items
    pub title: String,
    /// Body lines joined with `\n`
    pub body: String,
}

impl Incident {
    /// Creates an incident.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Structural layout of the sanction block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Target/content table, possibly flattened by OCR
    Tabular,
    /// Prose or key-value lines
    #[default]
    Narrative,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Tabular => write!(f, "tabular"),
            Layout::Narrative => write!(f, "narrative"),
        }
    }
}

/// How the document text was obtained upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMethod {
    /// PDF text layer
    #[default]
    Text,
    /// Optical character recognition
    Ocr,
}

impl SourceMethod {
    /// Maps the caller's OCR hint to a method.
    pub fn from_ocr_hint(is_ocr: bool) -> Self {
        if is_ocr {
            SourceMethod::Ocr
        } else {
            SourceMethod::Text
        }
    }

    /// Returns true for OCR output.
    pub fn is_ocr(&self) -> bool {
        *self == SourceMethod::Ocr
    }
}

impl std::fmt::Display for SourceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceMethod::Text => write!(f, "text"),
            SourceMethod::Ocr => write!(f, "ocr"),
        }
    }
}
