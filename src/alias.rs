//! Subject alias table and output assembly helpers.
//!
//! Sanction tables name their subjects in many spellings: `임원직원`,
//! `임·직원`, `임원 / 직원`, OCR-split `기 관`, trailing `등`. This module maps
//! every observed spelling onto the fixed subject vocabulary and joins
//! subjects and contents for the flattened record. It does no parsing of
//! its own beyond recognising an alias at the start of a line.

use crate::model::TargetSanction;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Fixed subject vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Subject {
    /// 기관
    Institution,
    /// 임원
    Officer,
    /// 직원
    Employee,
    /// 임직원
    OfficersAndEmployees,
    /// 보험설계사
    InsuranceAgent,
    /// 보험대리점
    InsuranceAgency,
    /// 보험중개사
    InsuranceBroker,
    /// 재심
    Review,
    /// 기타
    Other,
}

impl Subject {
    /// Canonical Korean label.
    pub fn label(&self) -> &'static str {
        match self {
            Subject::Institution => "기관",
            Subject::Officer => "임원",
            Subject::Employee => "직원",
            Subject::OfficersAndEmployees => "임직원",
            Subject::InsuranceAgent => "보험설계사",
            Subject::InsuranceAgency => "보험대리점",
            Subject::InsuranceBroker => "보험중개사",
            Subject::Review => "재심",
            Subject::Other => "기타",
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

use Subject::*;

/// Observed spellings and the subjects they denote. Whitespace in the text
/// is ignored when matching, so `임원 / 직원` matches `임원/직원`.
const SUBJECT_ALIASES: &[(&str, &[Subject])] = &[
    ("기관", &[Institution]),
    ("임원", &[Officer]),
    ("직원", &[Employee]),
    ("임직원", &[OfficersAndEmployees]),
    ("임원직원", &[Officer, Employee]),
    ("임원/직원", &[Officer, Employee]),
    ("임원|직원", &[Officer, Employee]),
    ("임원·직원", &[Officer, Employee]),
    ("임원ㆍ직원", &[Officer, Employee]),
    ("임원,직원", &[Officer, Employee]),
    ("임원및직원", &[Officer, Employee]),
    ("임원과직원", &[Officer, Employee]),
    ("임·직원", &[Officer, Employee]),
    ("임ㆍ직원", &[Officer, Employee]),
    ("임/직원", &[Officer, Employee]),
    ("보험설계사", &[InsuranceAgent]),
    ("보험대리점", &[InsuranceAgency]),
    ("보험중개사", &[InsuranceBroker]),
    ("재심", &[Review]),
    ("기타", &[Other]),
];

/// Alias entries ordered longest first, so `임원직원` wins over `임원`.
static ALIASES_LONGEST_FIRST: LazyLock<Vec<(&'static str, &'static [Subject])>> =
    LazyLock::new(|| {
        let mut entries = SUBJECT_ALIASES.to_vec();
        entries.sort_by_key(|(spelling, _)| std::cmp::Reverse(spelling.chars().count()));
        entries
    });

/// Characters stripped before an alias at the start of a line.
const LEADING_SEPARATORS: &[char] = &['|', '-', '·', '•', '◦', '.', 'ㆍ', ':', '*'];

static RE_HEADCOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\(（]\s*(\d+)\s*명\s*[\)）]$").unwrap());

/// An alias recognised at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectMatch<'a> {
    /// Subjects denoted by the alias
    pub subjects: &'static [Subject],
    /// Canonical label, including a folded `" 등"`
    pub label: String,
    /// Text after the alias with leading whitespace, `|` and `:` removed
    pub rest: &'a str,
    /// The alias ran straight into more text (`기관주의`)
    pub inline: bool,
    /// The line as it started at the alias, for inline sanctions
    pub from_alias: &'a str,
}

/// Recognises a subject alias at the start of `line`.
///
/// Leading separators and bullets are skipped; spaces inside the alias are
/// ignored. A standalone `등` after the alias is folded into the label.
///
/// ```
/// use sanction_notice::alias::match_subject_prefix;
///
/// let m = match_subject_prefix("기 관 등 | 기관주의").unwrap();
/// assert_eq!(m.label, "기관 등");
/// assert_eq!(m.rest, "기관주의");
/// ```
pub fn match_subject_prefix(line: &str) -> Option<SubjectMatch<'_>> {
    let start = line.trim_start_matches(|c: char| c.is_whitespace() || LEADING_SEPARATORS.contains(&c));

    let (subjects, end) = ALIASES_LONGEST_FIRST
        .iter()
        .find_map(|(spelling, subjects)| match_ignoring_whitespace(start, spelling).map(|end| (*subjects, end)))?;

    let mut label = label_for(subjects);
    let mut rest = &start[end..];

    let after_space = rest.trim_start();
    if let Some(tail) = after_space.strip_prefix('등') {
        if !tail.starts_with(crate::normalize::is_hangul_syllable) {
            label.push_str(" 등");
            rest = tail;
        }
    }

    let inline = rest.starts_with(crate::normalize::is_hangul_syllable);
    let rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '|' || c == ':' || c == '｜');

    Some(SubjectMatch {
        subjects,
        label,
        rest,
        inline,
        from_alias: start,
    })
}

/// Matches `key` at the start of `text`, skipping whitespace in `text`.
/// Returns the byte offset just past the match.
fn match_ignoring_whitespace(text: &str, key: &str) -> Option<usize> {
    let mut key_chars = key.chars().peekable();
    for (idx, c) in text.char_indices() {
        let Some(&expected) = key_chars.peek() else {
            return Some(idx);
        };
        if c == expected {
            key_chars.next();
        } else if !c.is_whitespace() {
            return None;
        }
    }
    key_chars.peek().is_none().then_some(text.len())
}

fn label_for(subjects: &[Subject]) -> String {
    subjects
        .iter()
        .map(Subject::label)
        .collect::<Vec<_>>()
        .join("|")
}

/// Canonicalizes a subject token.
///
/// Known spellings map onto the vocabulary (`임원직원` → `임원|직원`,
/// `기관등` → `기관 등`); a trailing `(N명)` headcount is kept as ` (N명)`.
/// Unknown tokens are returned trimmed with whitespace squeezed.
///
/// ```
/// use sanction_notice::alias::canonicalize_subject;
///
/// assert_eq!(canonicalize_subject("임원직원"), "임원|직원");
/// assert_eq!(canonicalize_subject("기관등"), "기관 등");
/// ```
pub fn canonicalize_subject(token: &str) -> String {
    let token = token.trim();
    if let Some(m) = match_subject_prefix(token) {
        if m.rest.is_empty() {
            return m.label;
        }
        if let Some(caps) = RE_HEADCOUNT.captures(m.rest) {
            return format!("{} ({}명)", m.label, &caps[1]);
        }
    }
    token.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Unique subject components of the pairs in first-seen order.
pub fn unique_subjects(pairs: &[TargetSanction]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for component in pairs.iter().flat_map(|p| p.subject.split('|')) {
        let component = component.trim();
        if !component.is_empty() && !seen.iter().any(|s| s == component) {
            seen.push(component.to_string());
        }
    }
    seen
}

/// Pipe-joined unique subjects (`기관|임원`).
pub fn join_subjects(pairs: &[TargetSanction]) -> String {
    unique_subjects(pairs).join("|")
}

/// Contents joined with `" | "` in pair order.
pub fn join_contents(pairs: &[TargetSanction]) -> String {
    pairs
        .iter()
        .map(|p| p.content.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}
