//! Raw rows of the sanction table.

use crate::normalize::remove_page_numbers;
use crate::section::sanction_section;
use regex::Regex;
use std::sync::LazyLock;

/// Headings that follow the table inside section 3 on some notices.
static RE_DETAILS_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*?\s*조\s*치\s*사\s*유|제\s*재\s*사\s*유|조\s*치\s*대\s*상\s*사\s*실|제\s*재\s*대\s*상\s*사\s*실")
        .unwrap()
});

/// Returns the rows of the section-3 table as trimmed lines, without the
/// header row.
///
/// Empty when the section is missing or holds only a header.
///
/// # Example
///
/// ```
/// use sanction_notice::pairs::extract_sanction_details;
///
/// let text = "3. 제재조치내용\n제재대상 제재내용\n기관 기관경고\n임원 주의 1명\n4. 제재대상사실";
/// assert_eq!(extract_sanction_details(text), "기관 기관경고\n임원 주의 1명");
/// ```
pub fn extract_sanction_details(text: &str) -> String {
    if text.starts_with('[') {
        return String::new();
    }
    let Some(section) = sanction_section(text) else {
        return String::new();
    };

    let lines: Vec<&str> = section
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.len() <= 1 {
        return String::new();
    }

    let rows = lines[1..].join("\n");
    let end = RE_DETAILS_END.find(&rows).map_or(rows.len(), |m| m.start());
    remove_page_numbers(rows[..end].trim()).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_without_header() {
        let text = "1. 금융기관명 : 갑\n3. 제재조치내용\n제재대상 제재내용\n기관\n기관경고\n- 2 -\n직원\n견책\n4. 제재대상사실\n가. 위반";
        assert_eq!(extract_sanction_details(text), "기관\n기관경고\n직원\n견책");
    }

    #[test]
    fn test_cut_at_reason_heading() {
        let text = "3. 조치내용\n대상 내용\n직원 주의\n* 조치사유 : 내부통제 미흡";
        assert_eq!(extract_sanction_details(text), "직원 주의");
    }

    #[test]
    fn test_header_only_or_missing() {
        assert_eq!(extract_sanction_details("3. 제재조치내용\n제재대상 제재내용"), "");
        assert_eq!(extract_sanction_details("본문"), "");
        assert_eq!(extract_sanction_details(""), "");
    }
}
