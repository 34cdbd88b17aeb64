//! Table-row state machine for OCR-flattened sanction tables.
//!
//! OCR reads a two-column table cell by cell, so subjects and contents end
//! up on separate lines:
//!
//! ```text
//! 제재대상 제재내용
//! 기관
//! 기관경고
//! 임원
//! 주의 1명
//! ```
//!
//! A line that starts with a subject alias opens a row; every other line is
//! a content fragment of the open row.

use super::{clean_fragment, RawPair};
use crate::alias::match_subject_prefix;
use crate::section::{is_loose_table_header, is_table_header, is_table_terminator, sanction_section};
use regex::Regex;
use std::sync::LazyLock;

static RE_HEADCOUNT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\((\d+)명\)\s*(.*)$").unwrap());

const RETIREE: &str = "퇴직자";

/// Lines of the table: after the first header line, or the whole sanction
/// section when no header exists, up to the grounds heading.
pub(crate) fn table_lines(text: &str) -> Vec<&str> {
    let mut lines = text.lines();
    let scope: Vec<&str> = if lines.any(is_loose_table_header) {
        lines.collect()
    } else {
        match sanction_section(text) {
            Some(section) => section.lines().collect(),
            None => return Vec::new(),
        }
    };

    scope
        .into_iter()
        .map(str::trim)
        .take_while(|line| !is_table_terminator(line))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Runs the state machine over table lines.
pub(crate) fn parse_table_rows(lines: &[&str]) -> Vec<RawPair> {
    let mut rows: Vec<RawPair> = Vec::new();
    let mut current: Option<RawPair> = None;
    // Content seen before its subject, handed to the next row
    let mut pending: Vec<String> = Vec::new();

    for &line in lines {
        if is_table_header(line) {
            continue;
        }

        let Some(m) = match_subject_prefix(line) else {
            match current.as_mut() {
                None => pending.push(line.to_string()),
                Some(open) if open.subject.starts_with("기관") && line.starts_with(RETIREE) => {
                    pending.push(line.to_string());
                }
                Some(open) => {
                    if let Some(rest) = fold_headcount(open, line) {
                        if !rest.is_empty() {
                            open.fragments.push(rest.to_string());
                        }
                    } else {
                        open.fragments.push(line.to_string());
                    }
                }
            }
            continue;
        };

        let inline = m.inline.then(|| format!("{}{}", m.label, m.rest));

        if let Some(open) = current.as_mut() {
            if open.subject == m.label {
                // Repeated subject cell of a row split over several lines
                match inline {
                    Some(sanction) => open.fragments.push(sanction),
                    None if m.rest.is_empty() => {}
                    None => open.fragments.push(m.rest.to_string()),
                }
                continue;
            }
        }

        if let Some(mut open) = current.take() {
            let mut deferred = take_deferred_retiree_fragments(&open.subject, &mut open.fragments);
            deferred.append(&mut pending);
            pending = deferred;
            rows.push(open);
        }

        let mut open = RawPair::new(m.label);
        open.fragments.append(&mut pending);
        match inline {
            Some(sanction) => open.fragments.push(sanction),
            None => match fold_headcount(&mut open, m.rest) {
                Some(rest) if !rest.is_empty() => open.fragments.push(rest.to_string()),
                Some(_) => {}
                None if m.rest.is_empty() => {}
                None => open.fragments.push(m.rest.to_string()),
            },
        }
        current = Some(open);
    }

    rows.extend(current);
    reassign_retiree_fragments(&mut rows);
    rows
}

/// Folds a leading `(N명)` into the row subject; returns the rest of the line.
fn fold_headcount<'a>(row: &mut RawPair, line: &'a str) -> Option<&'a str> {
    let caps = RE_HEADCOUNT_LINE.captures(line)?;
    let count = caps.get(1)?.as_str();
    if !row.subject.contains(&format!("({}명", count)) {
        row.subject = format!("{} ({}명)", row.subject, count);
    }
    Some(caps.get(2).map_or("", |m| m.as_str().trim()))
}

// ============================================================================
// Retiree heuristic
// ============================================================================
//
// OCR of some tables shifts a `퇴직자 ...` cell into the row above it. These
// two rules move such fragments back. They target one observed misalignment
// and are kept here, apart from the general row logic.

/// Returns true if a trailing `퇴직자` fragment of `subject` belongs to the
/// next row. A `견책상당` retiree note stays with an officer row.
fn belongs_to_next_row(subject: &str, fragment: &str) -> bool {
    let cleaned = clean_fragment(fragment);
    if !cleaned.starts_with(RETIREE) {
        return false;
    }
    let officer_reprimand =
        subject.contains("임원") && (cleaned.contains("견책상당") || cleaned.contains("견책 상당"));
    !officer_reprimand
}

/// Pops trailing retiree fragments of an institution or officer row that
/// belong to the next row. Returned in their original order.
fn take_deferred_retiree_fragments(subject: &str, fragments: &mut Vec<String>) -> Vec<String> {
    if !subject.contains("기관") && !subject.contains("임원") {
        return Vec::new();
    }
    let mut moved = Vec::new();
    while fragments
        .last()
        .is_some_and(|last| belongs_to_next_row(subject, last))
    {
        moved.extend(fragments.pop());
    }
    moved.reverse();
    moved
}

/// Moves `퇴직자 ... 견책` fragments of a row up to a preceding officer row
/// that has no retiree fragment of its own.
pub(crate) fn reassign_retiree_fragments(rows: &mut [RawPair]) {
    for idx in 1..rows.len() {
        let (before, after) = rows.split_at_mut(idx);
        let officer = &mut before[idx - 1];
        let next = &mut after[0];

        if !officer.subject.contains("임원") || officer.fragments.iter().any(|f| f.contains(RETIREE)) {
            continue;
        }

        let (moved, kept): (Vec<String>, Vec<String>) = std::mem::take(&mut next.fragments)
            .into_iter()
            .partition(|f| f.contains(RETIREE) && f.contains("견책"));
        next.fragments = kept;

        if !moved.is_empty() {
            tracing::trace!(count = moved.len(), "retiree fragments moved to officer row");
            let mut fragments = moved;
            fragments.append(&mut officer.fragments);
            officer.fragments = fragments;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(subject: &str, fragments: &[&str]) -> RawPair {
        RawPair {
            subject: subject.to_string(),
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn test_table_lines_after_header() {
        let text = "3. 제재조치내용\n제재대상 제재내용\n기관\n\n기관경고\n4. 제재대상사실\n본문";
        assert_eq!(table_lines(text), vec!["기관", "기관경고"]);
    }

    #[test]
    fn test_table_lines_without_header_use_section() {
        let text = "3. 제재조치내용\n기관\n기관경고\n4. 제재대상사실";
        assert_eq!(table_lines(text), vec!["기관", "기관경고"]);
        assert!(table_lines("본문만 있음").is_empty());
    }

    #[test]
    fn test_subject_lines_open_rows() {
        let rows = parse_table_rows(&["기관", "기관경고", "임원", "주의 1명", "직원", "견책 2명"]);
        assert_eq!(
            rows,
            vec![
                row("기관", &["기관경고"]),
                row("임원", &["주의 1명"]),
                row("직원", &["견책 2명"])
            ]
        );
    }

    #[test]
    fn test_pending_content_goes_to_first_subject() {
        let rows = parse_table_rows(&["과태료 1억원", "기관"]);
        assert_eq!(rows, vec![row("기관", &["과태료 1억원"])]);
    }

    #[test]
    fn test_repeated_bare_subject_ignored() {
        let rows = parse_table_rows(&["직원", "견책 1명", "직원", "주의 2명"]);
        assert_eq!(rows, vec![row("직원", &["견책 1명", "주의 2명"])]);
    }

    #[test]
    fn test_headcount_suffix() {
        let rows = parse_table_rows(&["직원", "(3명) 견책", "(3명)"]);
        assert_eq!(rows, vec![row("직원 (3명)", &["견책"])]);

        let rows = parse_table_rows(&["직원 (2명) 주의"]);
        assert_eq!(rows, vec![row("직원 (2명)", &["주의"])]);
    }

    #[test]
    fn test_retiree_under_institution_moves_to_next_row() {
        let rows = parse_table_rows(&["기관", "기관주의", "퇴직자 위법·부당사항 1명", "직원", "주의 1명"]);
        assert_eq!(
            rows,
            vec![
                row("기관", &["기관주의"]),
                row("직원", &["퇴직자 위법·부당사항 1명", "주의 1명"])
            ]
        );
    }

    #[test]
    fn test_trailing_retiree_fragment_deferred() {
        let rows = parse_table_rows(&["임원", "주의 1명", "- 퇴직자 주의상당 1명", "직원", "견책 1명"]);
        assert_eq!(
            rows,
            vec![
                row("임원", &["주의 1명"]),
                row("직원", &["- 퇴직자 주의상당 1명", "견책 1명"])
            ]
        );
    }

    #[test]
    fn test_officer_keeps_reprimand_equivalent() {
        let rows = parse_table_rows(&["임원", "주의 1명", "퇴직자 견책상당 1명", "직원", "견책 1명"]);
        assert_eq!(rows[0], row("임원", &["주의 1명", "퇴직자 견책상당 1명"]));
    }

    #[test]
    fn test_reassign_moves_reprimand_up_to_officer() {
        let mut rows = vec![
            row("임원", &["주의 1명"]),
            row("직원", &["퇴직자 견책상당 1명", "감봉 2명"]),
        ];
        reassign_retiree_fragments(&mut rows);
        assert_eq!(
            rows,
            vec![
                row("임원", &["퇴직자 견책상당 1명", "주의 1명"]),
                row("직원", &["감봉 2명"])
            ]
        );
    }

    #[test]
    fn test_reassign_skips_officer_with_retiree() {
        let mut rows = vec![
            row("임원", &["퇴직자 주의상당 1명"]),
            row("직원", &["퇴직자 견책상당 1명"]),
        ];
        let before = rows.clone();
        reassign_retiree_fragments(&mut rows);
        assert_eq!(rows, before);
    }
}
