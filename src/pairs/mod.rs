//! Target–sanction pair parser.
//!
//! Section 3 of a notice lists who was sanctioned and how. Depending on the
//! source the list is a one-line header match, a header followed by
//! `<subject> <content>` rows, an OCR-flattened table with subjects and
//! contents on separate lines, or no table at all. Each shape has its own
//! strategy; [`STRATEGIES`] lists them in priority order and the first one
//! that yields a pair wins.
//!
//! All strategies share the same post-processing: subjects are canonicalized
//! through [`crate::alias`], fragments are cleaned and `", "`-joined, content
//! is cut at the grounds heading, and pairs with the same subject are merged.

mod details;
mod table;

pub use details::extract_sanction_details;

use crate::alias::{canonicalize_subject, match_subject_prefix};
use crate::cascade::{first_match, Strategy};
use crate::model::{TargetSanction, OCR_FAILURE_MARKER};
use crate::normalize::clean_content_artifacts;
use crate::section::{
    compact, is_loose_table_header, is_table_terminator, narrative_section_start,
};
use regex::Regex;
use std::sync::LazyLock;

/// Words that mark a line remainder as sanction content.
const SANCTION_KEYWORDS: &[&str] = &[
    "과태료", "주의", "경고", "견책", "정지", "취소", "생략", "조치", "감봉",
];

/// Headings of the grounds section; content is cut before them.
const NARRATIVE_HEADINGS: &[&str] = &["제재대상사실", "조치대상사실"];

/// Bullets that continue the previous row.
const CONTINUATION_BULLETS: &[char] = &['-', '·', '◦', '•', '▪', 'ㆍ'];

/// Fixed result for re-examination notices.
const REVIEW_SUBJECT: &str = "재심";
const REVIEW_CONTENT: &str = "재조치 내용 참조";

static RE_INLINE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:제재|조치)?대상[ \t]*(?:제재|조치)?내용[ \t]*(기관|임원|직원|임직원)[ \t]+([^\r\n]+)")
        .unwrap()
});

static RE_LEADING_BULLETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[|\-·•◦\.]+\s*").unwrap());

static RE_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static RE_HEADCOUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\s*\d+\s*명\s*\)").unwrap());

static RE_NAME_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"금\s*융.*명").unwrap());

static RE_AGENT_ARTIFACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"보\s*험\s*설\s*계\s*사\s+(?:_\s*)?[_｜|]\s*-[ \t]*([^\n]*)").unwrap());

static RE_REGISTRATION_CANCELLED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"등\s*록\s*취\s*소").unwrap());

static RE_BUSINESS_SUSPENDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"업\s*무\s*정\s*지").unwrap());

static RE_FINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"과\s*태\s*료").unwrap());

static RE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Characters after an artifact row searched for its content.
const AGENT_SEARCH_CHARS: usize = 200;
/// Characters searched for counts and amounts.
const AGENT_NUMBER_CHARS: usize = 100;

/// A subject and its content fragments before post-processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawPair {
    pub subject: String,
    pub fragments: Vec<String>,
}

impl RawPair {
    pub(crate) fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            fragments: Vec::new(),
        }
    }

    pub(crate) fn with_content(subject: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            fragments: vec![content.into()],
        }
    }
}

/// A pair-extraction strategy.
pub type PairStrategy = Strategy<Vec<TargetSanction>>;

/// Pair strategies in priority order.
pub static STRATEGIES: [PairStrategy; 5] = [
    Strategy::new("inline_header", inline_header),
    Strategy::new("header_rows", header_rows),
    Strategy::new("table_rows", table_rows),
    Strategy::new("loose_scan", loose_scan),
    Strategy::new("agent_artifact", agent_artifact),
];

/// Extracts target–sanction pairs.
///
/// # Example
///
/// ```
/// use sanction_notice::extract_pairs;
///
/// let pairs = extract_pairs("3. 제재조치내용\n제재대상 제재내용\n기 관 과태료 18백만원\n임 원 주의 1명\n4. 제재대상사실");
/// assert_eq!(pairs.len(), 2);
/// assert_eq!(pairs[0].subject, "기관");
/// assert_eq!(pairs[0].content, "과태료 18백만원");
/// ```
pub fn extract_pairs(text: &str) -> Vec<TargetSanction> {
    if text.starts_with('[') || text.trim().is_empty() {
        return Vec::new();
    }

    if let Some(pairs) = review_override(text) {
        tracing::debug!("re-examination notice, pairs replaced");
        return pairs;
    }

    match first_match(&STRATEGIES, text) {
        Some((step, pairs)) => {
            tracing::debug!(strategy = step, count = pairs.len(), "pairs extracted");
            pairs
        }
        None => {
            tracing::debug!("no pair strategy matched");
            Vec::new()
        }
    }
}

/// Re-examination notices refer to a separate re-sanction section instead of
/// carrying a table of their own.
fn review_override(text: &str) -> Option<Vec<TargetSanction>> {
    let compact = compact(text);
    if compact.contains("제재대상제재내용") || compact.contains("조치대상조치내용") {
        return None;
    }
    let is_review =
        (compact.contains("재심") && compact.contains("재조치내용")) || compact.contains("재심처리안");
    is_review.then(|| vec![TargetSanction::new(REVIEW_SUBJECT, REVIEW_CONTENT)])
}

// ============================================================================
// Post-processing
// ============================================================================

/// Cleans one content fragment: leading bullets and separators, comma
/// spacing, whitespace runs and OCR table debris.
pub(crate) fn clean_fragment(fragment: &str) -> String {
    let fragment = RE_LEADING_BULLETS.replace(fragment.trim(), "");
    let fragment = fragment.trim_matches([' ', ',', ';']);
    let fragment = RE_COMMA.replace_all(fragment, ", ");
    let fragment = RE_WHITESPACE.replace_all(&fragment, " ");
    clean_content_artifacts(&fragment)
}

/// Cuts content at the first grounds heading.
fn truncate_at_narrative(content: &str) -> &str {
    let cut = NARRATIVE_HEADINGS
        .iter()
        .filter_map(|heading| content.find(heading))
        .min();
    match cut {
        Some(idx) => content[..idx].trim_end_matches([' ', ',', '|']),
        None => content,
    }
}

fn assemble_content(fragments: &[String]) -> String {
    let joined = fragments.join(" ");
    if matches!(joined.trim(), "-" | "_") {
        return OCR_FAILURE_MARKER.to_string();
    }
    let content = fragments
        .iter()
        .map(|f| clean_fragment(f))
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    truncate_at_narrative(&content).trim().to_string()
}

/// Applies the shared post-processing and merges pairs by subject in
/// first-seen order. Returns `None` when nothing survives.
fn finish(raw: Vec<RawPair>) -> Option<Vec<TargetSanction>> {
    let mut pairs: Vec<TargetSanction> = Vec::new();

    for pair in raw {
        let content = assemble_content(&pair.fragments);
        let subject = canonicalize_subject(&pair.subject);
        if content.is_empty() || subject.is_empty() {
            continue;
        }
        let existing = pairs.iter().position(|p| p.subject == subject);
        match existing {
            Some(idx) => {
                pairs[idx].content.push_str(", ");
                pairs[idx].content.push_str(&content);
            }
            None => pairs.push(TargetSanction::new(subject, content)),
        }
    }

    (!pairs.is_empty()).then_some(pairs)
}

fn has_sanction_keyword(text: &str) -> bool {
    SANCTION_KEYWORDS.iter().any(|kw| text.contains(kw))
}

fn is_continuation(line: &str) -> bool {
    line.starts_with(CONTINUATION_BULLETS)
}

// ============================================================================
// Strategy 1: Inline header
// ============================================================================

/// Header and first row on one line: `제재대상 제재내용 기관 과태료 5천만원`.
fn inline_header(text: &str) -> Option<Vec<TargetSanction>> {
    let caps = RE_INLINE_HEADER.captures(text)?;
    finish(vec![RawPair::with_content(&caps[1], &caps[2])])
}

// ============================================================================
// Strategy 2: Header then rows
// ============================================================================

/// A header line followed by `<subject> <content>` rows.
///
/// Gives up on a bare subject line, which means subjects and contents sit on
/// separate lines and the table-row parser has to handle the block.
fn header_rows(text: &str) -> Option<Vec<TargetSanction>> {
    let mut lines = text.lines();
    lines.find(|line| is_loose_table_header(line))?;

    let mut rows: Vec<RawPair> = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_table_terminator(line) {
            break;
        }

        if let Some(m) = match_subject_prefix(line) {
            if m.rest.is_empty() {
                return None;
            }
            let content = if m.inline {
                format!("{}{}", m.label, m.rest)
            } else {
                m.rest.to_string()
            };
            rows.push(RawPair::with_content(m.label, content));
            continue;
        }

        match rows.last_mut() {
            Some(last)
                if is_continuation(line) || has_sanction_keyword(line) || RE_HEADCOUNT.is_match(line) =>
            {
                last.fragments.push(line.to_string());
            }
            Some(_) => break,
            None => {}
        }
    }

    finish(rows)
}

// ============================================================================
// Strategy 3: Table rows
// ============================================================================

fn table_rows(text: &str) -> Option<Vec<TargetSanction>> {
    let lines = table::table_lines(text);
    if lines.is_empty() {
        return None;
    }
    finish(table::parse_table_rows(&lines))
}

// ============================================================================
// Strategy 4: Loose scan
// ============================================================================

/// Scans every line before the grounds section for a subject followed by
/// something that looks like a sanction.
fn loose_scan(text: &str) -> Option<Vec<TargetSanction>> {
    let scope = &text[..narrative_section_start(text).unwrap_or(text.len())];
    let mut rows: Vec<RawPair> = Vec::new();

    for line in scope.lines() {
        let line = line.trim();
        if line.is_empty() || line.contains("제재대상") || RE_NAME_LABEL.is_match(line) {
            continue;
        }

        if is_continuation(line) {
            if let Some(last) = rows.last_mut() {
                last.fragments.push(line.to_string());
            }
            continue;
        }

        let Some(m) = match_subject_prefix(line) else {
            continue;
        };

        if m.inline {
            let first_word = m.from_alias.split_whitespace().next().unwrap_or_default();
            if has_sanction_keyword(first_word) {
                rows.push(RawPair::with_content(m.label.clone(), format!("{}{}", m.label, m.rest)));
            }
        } else if m.rest.chars().any(|c| c.is_ascii_digit()) || has_sanction_keyword(m.rest) {
            rows.push(RawPair::with_content(m.label, m.rest));
        }
    }

    finish(rows)
}

// ============================================================================
// Strategy 5: Insurance-agent table artifact
// ============================================================================

/// OCR of some insurance-agent notices reduces the table to
/// `보험설계사 _ | - ...`; the content is recovered from the sanction words
/// near the artifact.
fn agent_artifact(text: &str) -> Option<Vec<TargetSanction>> {
    let caps = RE_AGENT_ARTIFACT.captures(text)?;
    let same_line = caps.get(1).map_or("", |m| m.as_str());

    let content = if RE_REGISTRATION_CANCELLED.is_match(same_line) {
        match first_numbers(same_line, 1).first() {
            Some(count) => format!("등록취소 {}명", count),
            None => "등록취소".to_string(),
        }
    } else {
        let end = caps.get(0).map_or(0, |m| m.end());
        let area: String = text[end..].chars().take(AGENT_SEARCH_CHARS).collect();
        let head: String = area.chars().take(AGENT_NUMBER_CHARS).collect();
        let numbers = first_numbers(&head, 2);

        if RE_REGISTRATION_CANCELLED.is_match(&area) {
            format!("등록취소 {}명", numbers.first()?)
        } else if RE_BUSINESS_SUSPENDED.is_match(&area) {
            match numbers.as_slice() {
                [days, count, ..] => format!("업무정지 {}일 ({}명)", days, count),
                [days] => format!("업무정지 {}일", days),
                [] => return None,
            }
        } else if RE_FINE.is_match(&area) {
            format!("과태료 {}만원", numbers.first()?)
        } else {
            return None;
        }
    };

    finish(vec![RawPair::with_content("보험설계사", content)])
}

fn first_numbers(text: &str, limit: usize) -> Vec<&str> {
    RE_DIGITS.find_iter(text).take(limit).map(|m| m.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::CascadeStep;

    fn pair(subject: &str, content: &str) -> TargetSanction {
        TargetSanction::new(subject, content)
    }

    #[test]
    fn test_inline_header_wins_over_rows() {
        let text = "제재대상 제재내용 기관 과태료 5천만원\n임원 주의 1명";
        assert_eq!(extract_pairs(text), vec![pair("기관", "과태료 5천만원")]);
    }

    #[test]
    fn test_header_rows() {
        let text = "3. 제재조치내용\n제재대상 제재내용\n기 관 과태료 18백만원\n임 원 주의 1명\n직 원 견책 1명\n4. 제재대상사실\n가. 위반";
        assert_eq!(
            extract_pairs(text),
            vec![
                pair("기관", "과태료 18백만원"),
                pair("임원", "주의 1명"),
                pair("직원", "견책 1명")
            ]
        );
    }

    #[test]
    fn test_header_rows_continuation_and_end() {
        let text = "대상 내용\n직원 ◦ 자율처리 필요사항 1건\n- 퇴직자 위법·부당사항 1명\n이 사건은 다음과 같다\n임원 주의 1명";
        assert_eq!(
            extract_pairs(text),
            vec![pair("직원", "자율처리 필요사항 1건, 퇴직자 위법·부당사항 1명")]
        );
    }

    #[test]
    fn test_tabular_rows() {
        let text = "3. 제재조치내용\n제재대상 제재내용\n기관\n기관경고\n임원\n주의 1명\n퇴직자 견책상당 1명\n직원\n(2명) 견책\n4. 제재대상사실\n가. 위반";
        assert_eq!(
            extract_pairs(text),
            vec![
                pair("기관", "기관경고"),
                pair("임원", "주의 1명, 퇴직자 견책상당 1명"),
                pair("직원 (2명)", "견책")
            ]
        );
    }

    #[test]
    fn test_strategy_order() {
        let names: Vec<_> = STRATEGIES.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["inline_header", "header_rows", "table_rows", "loose_scan", "agent_artifact"]
        );
    }

    #[test]
    fn test_stacked_rows_in_narrative_layout() {
        let text = "제재대상 제재내용\n임원\n주의 1명\n4. 제재대상사실\n가. 위반";
        assert_eq!(crate::sanction_layout(text), crate::model::Layout::Narrative);
        assert_eq!(extract_pairs(text), vec![pair("임원", "주의 1명")]);

        let text = "3. 제재조치내용\n제재대상 제재내용\n임원\n주의 1명\n4. 제재대상사실\n가. 위반";
        assert_eq!(extract_pairs(text), vec![pair("임원", "주의 1명")]);
    }

    #[test]
    fn test_loose_scan() {
        let text = "1. 금융기관명 : 갑은행\n기관 과태료 3천만원\n기관은 고객 보호를 소홀히 하였다\n직원 견책 2명\n· 퇴직자 1명\n4. 제재대상사실\n직원 주의 9명";
        assert_eq!(
            loose_scan(text),
            Some(vec![pair("기관", "과태료 3천만원"), pair("직원", "견책 2명, 퇴직자 1명")])
        );
    }

    #[test]
    fn test_loose_scan_inline_keyword() {
        assert_eq!(loose_scan("기관경고 및 과태료"), Some(vec![pair("기관", "기관경고 및 과태료")]));
        assert_eq!(loose_scan("기관은 영업을 하였다"), None);
    }

    #[test]
    fn test_agent_artifact() {
        assert_eq!(
            agent_artifact("보험설계사 _ | - 등록취소 1명"),
            Some(vec![pair("보험설계사", "등록취소 1명")])
        );
        assert_eq!(
            agent_artifact("보험설계사 | -\n업무정지 30일 2명"),
            Some(vec![pair("보험설계사", "업무정지 30일 (2명)")])
        );
        assert_eq!(
            agent_artifact("보험설계사 _ -\n과태료 500"),
            Some(vec![pair("보험설계사", "과태료 500만원")])
        );
        assert_eq!(agent_artifact("보험설계사 등록취소"), None);
    }

    #[test]
    fn test_lone_dash_becomes_failure_marker() {
        let text = "제재대상 제재내용\n기관 -\n4. 제재대상사실";
        assert_eq!(
            extract_pairs(text),
            vec![pair("기관", OCR_FAILURE_MARKER)]
        );
    }

    #[test]
    fn test_content_truncated_at_grounds_heading() {
        let text = "제재대상 제재내용 기관 기관경고, 제재대상사실 가. 위반";
        assert_eq!(extract_pairs(text), vec![pair("기관", "기관경고")]);
    }

    #[test]
    fn test_same_subject_merged() {
        let raw = vec![
            RawPair::with_content("기관", "기관주의"),
            RawPair::with_content("임원직원", "주의"),
            RawPair::with_content("기 관", "과태료 1억원"),
        ];
        assert_eq!(
            finish(raw),
            Some(vec![pair("기관", "기관주의, 과태료 1억원"), pair("임원|직원", "주의")])
        );
    }

    #[test]
    fn test_review_override() {
        let text = "재심 결과\n3. 재조치 내용\n기관 과태료 1억원";
        assert_eq!(extract_pairs(text), vec![pair("재심", "재조치 내용 참조")]);

        let with_header = "재심\n제재대상 제재내용\n재조치 내용\n기관 과태료 1억원";
        assert_ne!(extract_pairs(with_header), vec![pair("재심", "재조치 내용 참조")]);
    }

    #[test]
    fn test_clean_fragment() {
        assert_eq!(clean_fragment("- 과태료 ,5천만원 ;"), "과태료, 5천만원");
        assert_eq!(clean_fragment("| 업 무 정 지 30일"), "업무정지 30일");
    }

    #[test]
    fn test_empty_and_failure_marker() {
        assert!(extract_pairs("").is_empty());
        assert!(extract_pairs("   \n ").is_empty());
        assert!(extract_pairs("[PDF 추출 실패] 제재대상 제재내용 기관 과태료").is_empty());
        assert!(extract_pairs("이 문서는 공지사항입니다").is_empty());
    }
}
