//! Header metadata extraction: institution name and sanction date.
//!
//! Both fields are labeled, numbered lines near the top of a notice
//! ("1. 금융기관명 : ...", "2. 제재조치일 : ..."). OCR and different issuing
//! departments spell the labels in several ways, so each field is an ordered
//! list of patterns; the first pattern that yields a non-empty value wins.

use crate::cascade::{first_match, LabeledPattern};
use crate::model::Metadata;
use regex::Regex;
use std::sync::LazyLock;

/// Valid year range for normalized dates.
const YEAR_RANGE: std::ops::RangeInclusive<u32> = 1900..=2100;

static RE_LEADING_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[:\-.\s]+").unwrap());
static RE_TRAILING_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\-.\s]+$").unwrap());
static RE_DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Trims a captured label value: first line only, leading `:`/`-`/`.`,
/// trailing `-`/`.` and whitespace on both sides.
pub fn clean_field_value(raw: &str) -> String {
    let first_line = raw.split(['\n', '\r']).next().unwrap_or_default();
    let leading = RE_LEADING_PUNCT.replace(first_line.trim(), "");
    RE_TRAILING_PUNCT.replace(&leading, "").trim().to_string()
}

macro_rules! labeled {
    ($name:literal, $pattern:literal) => {
        LabeledPattern {
            name: $name,
            pattern: LazyLock::new(|| Regex::new($pattern).unwrap()),
            clean: clean_field_value,
        }
    };
}

/// Institution-name patterns in priority order.
pub static INSTITUTION_PATTERNS: [LabeledPattern; 6] = [
    labeled!("spaced_institution", r"1\.\s*금\s*융\s*기\s*관\s*명[ \t]*[:：]?[ \t]*([^\n\r]+)"),
    labeled!("institution", r"1\.\s*금융기관명[ \t]*[:：]?[ \t]*([^\n\r]+)"),
    labeled!("loose_numbered_institution", r"1\s*\.\s*금\s*융\s*기\s*관\s*명[ \t]*[:：]?[ \t]*([^\n\r]+)"),
    labeled!("spaced_company", r"1\.\s*금\s*융\s*회\s*사\s*등\s*명[ \t]*[:：][ \t]*([^\n\r]+)"),
    labeled!("company", r"1\.\s*금융회사등\s*명[ \t]*[:：][ \t]*([^\n\r]+)"),
    labeled!("agency", r"1\.\s*기\s*관\s*명[ \t]*[:：][ \t]*([^\n\r]+)"),
];

/// Sanction-date patterns in priority order.
pub static DATE_PATTERNS: [LabeledPattern; 7] = [
    labeled!("spaced_sanction_date_label", r"2\.\s*제\s*재\s*조\s*치\s+일\s*자[ \t]*[:：]?[ \t]*([^\n\r]+)"),
    labeled!("sanction_date_label", r"2\.\s*제재조치\s+일\s*자[ \t]*[:：]?[ \t]*([^\n\r]+)"),
    labeled!("compact_sanction_date_label", r"2\.\s*제재조치\s*일자[ \t]*[:：]?[ \t]*([^\n\r]+)"),
    labeled!("spaced_sanction_date", r"2\.\s*제\s*재\s*조\s*치\s*일[ \t]*[:：]?[ \t]*([^\n\r]+)"),
    labeled!("sanction_date", r"2\.\s*제재조치일[ \t]*[:：]?[ \t]*([^\n\r]+)"),
    labeled!("loose_numbered_date", r"2\s*\.\s*제\s*재\s*조\s*치\s*일[ \t]*[:：]?[ \t]*([^\n\r]+)"),
    labeled!("action_date", r"2\.\s*조\s*치\s*일[ \t]*[:：][ \t]*([^\n\r]+)"),
];

/// Extracts institution name and sanction date.
///
/// Missing fields are empty strings; the date is ISO formatted when it can be
/// validated and returned as written otherwise.
///
/// # Example
///
/// ```
/// use sanction_notice::extract_metadata;
///
/// let meta = extract_metadata("1. 금융기관명 : 테스트은행\n2. 제재조치일 : 2024. 5. 15.");
/// assert_eq!(meta.institution, "테스트은행");
/// assert_eq!(meta.sanction_date, "2024-05-15");
/// ```
pub fn extract_metadata(text: &str) -> Metadata {
    if text.starts_with('[') {
        return Metadata::default();
    }

    Metadata {
        institution: extract_institution(text).unwrap_or_default(),
        sanction_date: extract_sanction_date(text).unwrap_or_default(),
    }
}

/// Extracts the institution name, if a labeled line is present.
pub fn extract_institution(text: &str) -> Option<String> {
    first_match(&INSTITUTION_PATTERNS, text).map(|(_, value)| value)
}

/// Extracts the sanction date, normalized with [`normalize_date`].
pub fn extract_sanction_date(text: &str) -> Option<String> {
    first_match(&DATE_PATTERNS, text).map(|(_, value)| normalize_date(&value))
}

/// Reformats a date string as `YYYY-MM-DD`.
///
/// Uses the first three digit runs as year, month and day. Returns the input
/// unchanged when fewer than three runs exist or any part is out of range.
///
/// ```
/// use sanction_notice::metadata::normalize_date;
///
/// assert_eq!(normalize_date("2024. 5. 15."), "2024-05-15");
/// assert_eq!(normalize_date("2024. 13. 40."), "2024. 13. 40.");
/// ```
pub fn normalize_date(raw: &str) -> String {
    parse_date_parts(raw)
        .map(|(year, month, day)| format!("{:04}-{:02}-{:02}", year, month, day))
        .unwrap_or_else(|| raw.to_string())
}

fn parse_date_parts(raw: &str) -> Option<(u32, u32, u32)> {
    let mut runs = RE_DIGIT_RUN.find_iter(raw).map(|m| m.as_str().parse::<u32>());
    let year = runs.next()?.ok()?;
    let month = runs.next()?.ok()?;
    let day = runs.next()?.ok()?;

    let valid = YEAR_RANGE.contains(&year) && (1..=12).contains(&month) && (1..=31).contains(&day);
    valid.then_some((year, month, day))
}
