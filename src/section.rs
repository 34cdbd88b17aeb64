//! Top-level section markers of a sanction notice.
//!
//! Notices follow a numbered outline: `1. 금융기관명`, `2. 제재조치일`,
//! `3. 제재조치내용` (the sanction table) and `4. 제재대상사실` (the grounds,
//! sometimes numbered `Ⅳ.`). This module finds those sections and recognises
//! the table header line shared by the classifier and the pair parser.

use crate::cascade::{first_match, CascadeStep};
use regex::Regex;
use std::sync::LazyLock;

/// A section-start pattern; yields the byte offset just past the marker.
pub struct MarkerPattern {
    /// Step name
    pub name: &'static str,
    /// Marker pattern
    pub pattern: LazyLock<Regex>,
}

impl CascadeStep<usize> for MarkerPattern {
    fn name(&self) -> &'static str {
        self.name
    }

    fn attempt(&self, input: &str) -> Option<usize> {
        self.pattern.find(input).map(|m| m.end())
    }
}

macro_rules! marker {
    ($name:literal, $pattern:expr) => {
        MarkerPattern {
            name: $name,
            pattern: LazyLock::new(|| Regex::new($pattern).unwrap()),
        }
    };
}

/// Start of the sanction table section, in priority order.
pub static SANCTION_SECTION_PATTERNS: [MarkerPattern; 5] = [
    marker!("sanction_action_content", r"(?:^|[^0-9])3\s*\.\s*제\s*재\s*조\s*치\s*(?:세\s*부\s*)?내\s*용"),
    marker!("action_content", r"(?:^|[^0-9])3\s*\.\s*조\s*치\s*내\s*용"),
    marker!("sanction_content", r"(?:^|[^0-9])3\s*\.\s*제\s*재\s*내\s*용"),
    marker!("disposition_content", r"(?:^|[^0-9])3\s*\.\s*처\s*분\s*내\s*용"),
    marker!("sanction_action", r"(?m)(?:^|[^0-9])3\s*\.\s*제\s*재\s*조\s*치\s*$"),
];

/// Start of the grounds (narrative) section, numbered forms before Roman ones.
pub static NARRATIVE_SECTION_PATTERNS: [MarkerPattern; 14] = [
    marker!("sanctioned_facts", r"(?:^|[^0-9])4\s*\.\s*제\s*재\s*대\s*상\s*사\s*실"),
    marker!("action_facts", r"(?:^|[^0-9])4\s*\.\s*조\s*치\s*대\s*상\s*사\s*실"),
    marker!("sanction_action_grounds", r"(?:^|[^0-9])4\s*\.\s*제\s*재\s*조\s*치\s*사\s*유"),
    marker!("sanction_grounds", r"(?:^|[^0-9])4\s*\.\s*제\s*재\s*사\s*유"),
    marker!("action_grounds", r"(?:^|[^0-9])4\s*\.\s*조\s*치\s*사\s*유"),
    marker!("violations", r"(?:^|[^0-9])4\s*\.\s*위\s*반\s*내\s*용"),
    marker!("grounds", r"(?:^|[^0-9])4\s*\.\s*사\s*유"),
    marker!("roman_sanctioned_facts", r"(?:Ⅳ|IV)\s*[\.．]\s*제\s*재\s*대\s*상\s*사\s*실"),
    marker!("roman_action_facts", r"(?:Ⅳ|IV)\s*[\.．]\s*조\s*치\s*대\s*상\s*사\s*실"),
    marker!("roman_sanction_action_grounds", r"(?:Ⅳ|IV)\s*[\.．]\s*제\s*재\s*조\s*치\s*사\s*유"),
    marker!("roman_sanction_grounds", r"(?:Ⅳ|IV)\s*[\.．]\s*제\s*재\s*사\s*유"),
    marker!("roman_action_grounds", r"(?:Ⅳ|IV)\s*[\.．]\s*조\s*치\s*사\s*유"),
    marker!("roman_violations", r"(?:Ⅳ|IV)\s*[\.．]\s*위\s*반\s*내\s*용"),
    marker!("roman_grounds", r"(?:Ⅳ|IV)\s*[\.．]\s*사\s*유"),
];

/// End of the sanction section: the next top-level item from 4 on.
static RE_AFTER_SANCTION_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\s*(?:[4-9]\s*\.\s*[가-힣]|(?:Ⅳ|Ⅴ|IV)\s*[\.．])").unwrap()
});

/// End of the narrative section: the next top-level item from 5 on.
static RE_AFTER_NARRATIVE_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\s*(?:[5-9]\s*\.\s*[가-힣]|(?:Ⅴ|Ⅵ)\s*[\.．])").unwrap()
});

/// A line that announces the narrative section.
static RE_NARRATIVE_MARKER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"4\s*[\.。]\s*(?:제\s*재\s*대\s*상\s*사\s*실|조\s*치\s*대\s*상\s*사\s*실|제\s*재\s*조\s*치\s*사\s*유|제\s*재\s*대\s*상)",
    )
    .unwrap()
});

/// A line that announces the sanction table section.
static RE_SANCTION_HEADER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"3\s*[\.。]\s*(?:제\s*재\s*조\s*치\s*내\s*용|조\s*치\s*내\s*용)").unwrap()
});

/// Maximum compact length of a loose `대상 / 내용` header line.
const MAX_LOOSE_HEADER_CHARS: usize = 24;

/// Returns the body of the sanction table section (after its heading, up to
/// the next top-level item).
pub fn sanction_section(text: &str) -> Option<&str> {
    let (_, body_start, end) = sanction_bounds(text)?;
    Some(&text[body_start..end])
}

/// Returns the sanction table section starting at its heading line.
pub fn sanction_block(text: &str) -> Option<&str> {
    let (line_start, _, end) = sanction_bounds(text)?;
    Some(&text[line_start..end])
}

/// Heading line start, body start and end offsets of the sanction section.
fn sanction_bounds(text: &str) -> Option<(usize, usize, usize)> {
    let (_, body_start) = first_match(&SANCTION_SECTION_PATTERNS, text)?;
    let line_start = text[..body_start].rfind('\n').map_or(0, |i| i + 1);
    let rest = &text[body_start..];
    let end = RE_AFTER_SANCTION_SECTION
        .find(rest)
        .map_or(rest.len(), |m| m.start());
    Some((line_start, body_start, body_start + end))
}

/// Returns the body of the narrative section (after its heading, up to the
/// next top-level item).
pub fn narrative_section(text: &str) -> Option<&str> {
    let (name, start) = first_match(&NARRATIVE_SECTION_PATTERNS, text)?;
    let rest = &text[start..];
    let end = RE_AFTER_NARRATIVE_SECTION
        .find(rest)
        .map_or(rest.len(), |m| m.start());
    tracing::debug!(marker = name, bytes = end, "narrative section located");
    Some(&rest[..end])
}

/// Byte offset where the narrative section heading starts, if any.
pub fn narrative_section_start(text: &str) -> Option<usize> {
    NARRATIVE_SECTION_PATTERNS
        .iter()
        .find_map(|marker| marker.pattern.find(text))
        .map(|m| m.start())
}

/// Returns true if the line is a narrative-section heading.
pub fn is_narrative_marker_line(line: &str) -> bool {
    RE_NARRATIVE_MARKER_LINE.is_match(line)
}

/// Returns true if the line is a sanction-section heading.
pub fn is_sanction_header_line(line: &str) -> bool {
    RE_SANCTION_HEADER_LINE.is_match(line)
}

/// Removes all whitespace, for comparing OCR-spaced text.
pub fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Returns true if the line is a `제재대상 제재내용` style table header.
///
/// Compared without whitespace; lines naming `대상사실` are headings of the
/// narrative section, not table headers.
pub fn is_table_header(line: &str) -> bool {
    let compact = compact(line);
    let has_target = compact.contains("제재대상") || compact.contains("조치대상");
    let has_content = compact.contains("제재내용") || compact.contains("조치내용");
    has_target && has_content && !compact.contains("대상사실")
}

/// Looser header test: any short line naming a `대상` and a `내용`/`내역`
/// column, such as `대상 내용` or `조치대상자 조치내역`.
pub fn is_loose_table_header(line: &str) -> bool {
    let compact = compact(line);
    compact.chars().count() <= MAX_LOOSE_HEADER_CHARS
        && compact.contains("대상")
        && (compact.contains("내용") || compact.contains("내역"))
        && !compact.contains("대상사실")
}

/// Returns true if the line ends the sanction table: a narrative heading or
/// the next numbered top-level item.
pub fn is_table_terminator(line: &str) -> bool {
    let trimmed = line.trim_start();
    let compact = compact(trimmed);
    compact.starts_with("제재대상사실")
        || compact.starts_with("조치대상사실")
        || compact.starts_with("4.")
        || trimmed.starts_with('Ⅳ')
        || trimmed.starts_with("IV")
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTICE: &str = "1. 금융기관명 : 테스트은행\n\
                          2. 제재조치일 : 2024. 5. 15.\n\
                          3. 제재조치내용\n\
                          제재대상 제재내용\n\
                          기관 기관경고\n\
                          4. 제재대상사실\n\
                          가. 내부통제 미흡\n\
                          본문\n\
                          5. 기타\n\
                          끝";

    #[test]
    fn test_sanction_section_bounds() {
        let section = sanction_section(NOTICE).unwrap();
        assert_eq!(section.trim(), "제재대상 제재내용\n기관 기관경고");
    }

    #[test]
    fn test_sanction_block_starts_at_heading_line() {
        let block = sanction_block(NOTICE).unwrap();
        assert!(block.starts_with("3. 제재조치내용\n"));
        assert!(block.trim_end().ends_with("기관 기관경고"));
        assert_eq!(sanction_block("3. 조치내용\n기관"), Some("3. 조치내용\n기관"));
        assert_eq!(sanction_block("본문"), None);
    }

    #[test]
    fn test_narrative_section_bounds() {
        let section = narrative_section(NOTICE).unwrap();
        assert_eq!(section.trim(), "가. 내부통제 미흡\n본문");
    }

    #[test]
    fn test_narrative_section_spaced_and_roman() {
        assert!(narrative_section("4. 제 재 대 상 사 실\n내용").is_some());
        assert!(narrative_section("Ⅳ. 조치대상사실\n내용").is_some());
        assert!(narrative_section("2024. 사유").is_none());
    }

    #[test]
    fn test_table_headers() {
        assert!(is_table_header("제재대상  제재내용"));
        assert!(is_table_header("조 치 대 상 조 치 내 용"));
        assert!(!is_table_header("4. 제재대상사실 및 제재내용"));
        assert!(is_loose_table_header("대상 내용"));
        assert!(!is_loose_table_header("이 사건 대상 기관은 내용을 충분히 검토하지 아니한 채 상품을 판매하였다"));
    }

    #[test]
    fn test_table_terminator() {
        assert!(is_table_terminator("4. 제재대상사실"));
        assert!(is_table_terminator("  제 재 대 상 사 실"));
        assert!(is_table_terminator("Ⅳ. 사유"));
        assert!(!is_table_terminator("기관 기관경고"));
    }
}
