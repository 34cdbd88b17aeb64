//! Tabular vs narrative classification of a sanction block.
//!
//! OCR flattens the sanction table into lines, and some notices have no
//! table at all. The pair parser needs to know which it is looking at, so
//! this module scores the first lines of a block on a few structural signals.
//!
//! # Scoring
//!
//! | Signal | Points |
//! |--------|--------|
//! | Target/content header line in the first 20 lines | +4 |
//! | Run of ≥5 consecutive short lines in the first 50 | +3 |
//! | ≥2 lines with a tab or ≥2 pipes in the first 30 | +2 |
//! | `3. 제재조치내용` followed by a header within 10 lines | +3 |
//!
//! A narrative heading (`4. 제재대상사실`) in the first 30 lines overrides
//! everything and classifies the block as narrative.

use crate::model::Layout;
use crate::section::{is_narrative_marker_line, is_sanction_header_line, is_table_header};
use serde::Serialize;

/// Configuration for format classification.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Minimum score for a tabular verdict.
    pub threshold: u32,

    /// Lines searched for the target/content header.
    pub header_window: usize,

    /// Lines searched for narrative markers, separators and section headers.
    pub marker_window: usize,

    /// Lines searched for short-line runs.
    pub short_line_window: usize,

    /// A line shorter than this many characters counts as short.
    pub short_line_max_chars: usize,

    /// Minimum run of short lines that signals a table.
    pub min_short_run: usize,

    /// Lines after a section heading searched for the table header.
    pub section_lookahead: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold: 5,
            header_window: 20,
            marker_window: 30,
            short_line_window: 50,
            short_line_max_chars: 40,
            min_short_run: 5,
            section_lookahead: 10,
        }
    }
}

impl ClassifierConfig {
    /// Create a new classifier config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tabular score threshold.
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the short-line length limit.
    pub fn with_short_line_max_chars(mut self, chars: usize) -> Self {
        self.short_line_max_chars = chars.max(1);
        self
    }

    /// Set the minimum short-line run.
    pub fn with_min_short_run(mut self, run: usize) -> Self {
        self.min_short_run = run.max(2);
        self
    }
}

/// A structural signal that contributed to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Target/content header line
    HeaderLine,
    /// Run of consecutive short lines
    ShortLineRun,
    /// Tab or pipe separators
    Separators,
    /// Sanction heading directly followed by a header line
    SectionHeader,
}

impl Signal {
    /// Points the signal adds to the score.
    pub fn weight(&self) -> u32 {
        match self {
            Signal::HeaderLine => 4,
            Signal::ShortLineRun => 3,
            Signal::Separators => 2,
            Signal::SectionHeader => 3,
        }
    }
}

/// Result of classifying a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatAssessment {
    /// Final verdict
    pub layout: Layout,
    /// Total score
    pub score: u32,
    /// Signals that fired, in evaluation order
    pub signals: Vec<Signal>,
    /// A narrative heading forced the verdict
    pub narrative_marker: bool,
    /// Longest run of consecutive short lines
    pub longest_short_run: usize,
}

impl FormatAssessment {
    /// Returns true for a tabular verdict.
    pub fn is_tabular(&self) -> bool {
        self.layout == Layout::Tabular
    }
}

/// Classifies a block with the default configuration.
///
/// # Example
///
/// ```
/// use sanction_notice::is_tabular;
///
/// let block = "제재대상  제재내용\n기관\n기관경고\n임원\n주의 1명\n직원\n견책 2명";
/// assert!(is_tabular(block));
/// assert!(!is_tabular("4. 제재대상사실\n가. 내부통제 미흡"));
/// ```
pub fn is_tabular(text: &str) -> bool {
    assess(text).is_tabular()
}

/// Scores a block with the default configuration.
pub fn assess(text: &str) -> FormatAssessment {
    assess_with(text, &ClassifierConfig::default())
}

/// Scores a block with the given configuration.
pub fn assess_with(text: &str, config: &ClassifierConfig) -> FormatAssessment {
    let lines: Vec<&str> = text.lines().collect();
    let longest_short_run = longest_short_run(&lines, config);

    if text.starts_with('[')
        || lines
            .iter()
            .take(config.marker_window)
            .any(|line| is_narrative_marker_line(line))
    {
        tracing::debug!("narrative marker found, skipping table scoring");
        return FormatAssessment {
            layout: Layout::Narrative,
            score: 0,
            signals: Vec::new(),
            narrative_marker: !text.starts_with('['),
            longest_short_run,
        };
    }

    let mut signals = Vec::new();

    if lines
        .iter()
        .take(config.header_window)
        .any(|line| is_table_header(line))
    {
        signals.push(Signal::HeaderLine);
    }

    if longest_short_run >= config.min_short_run {
        signals.push(Signal::ShortLineRun);
    }

    let separator_lines = lines
        .iter()
        .take(config.marker_window)
        .filter(|line| line.contains('\t') || line.matches('|').count() >= 2)
        .count();
    if separator_lines >= 2 {
        signals.push(Signal::Separators);
    }

    if section_header_precedes_table(&lines, config) {
        signals.push(Signal::SectionHeader);
    }

    let score = signals.iter().map(Signal::weight).sum();
    let layout = if score >= config.threshold {
        Layout::Tabular
    } else {
        Layout::Narrative
    };
    tracing::debug!(score, %layout, "format classified");

    FormatAssessment {
        layout,
        score,
        signals,
        narrative_marker: false,
        longest_short_run,
    }
}

/// Longest run of consecutive non-empty lines shorter than the limit.
fn longest_short_run(lines: &[&str], config: &ClassifierConfig) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for line in lines.iter().take(config.short_line_window) {
        let trimmed = line.trim();
        if !trimmed.is_empty() && trimmed.chars().count() < config.short_line_max_chars {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Returns true if the first sanction heading is followed by a table header
/// within the lookahead.
fn section_header_precedes_table(lines: &[&str], config: &ClassifierConfig) -> bool {
    let window = &lines[..lines.len().min(config.marker_window)];
    let Some(heading) = window.iter().position(|line| is_sanction_header_line(line)) else {
        return false;
    };
    lines
        .iter()
        .skip(heading + 1)
        .take(config.section_lookahead)
        .any(|line| is_table_header(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_followed_by_short_lines_is_tabular() {
        let block = "제재대상  제재내용\n기관\n기관경고\n임원\n주의 1명\n직원\n견책 2명\n감봉 1명\n과태료";
        let assessment = assess(block);
        assert!(assessment.is_tabular());
        assert!(assessment.score >= 5);
        assert_eq!(assessment.signals, vec![Signal::HeaderLine, Signal::ShortLineRun]);
    }

    #[test]
    fn test_narrative_marker_overrides() {
        let block = "4. 제재대상사실\n제재대상  제재내용\n기관\n기관경고\n임원\n주의\n직원\n견책";
        let assessment = assess(block);
        assert!(!assessment.is_tabular());
        assert!(assessment.narrative_marker);
        assert_eq!(assessment.score, 0);
    }

    #[test]
    fn test_short_lines_alone_are_not_enough() {
        let block = "가\n나\n다\n라\n마\n바";
        let assessment = assess(block);
        assert_eq!(assessment.score, 3);
        assert!(!assessment.is_tabular());
    }

    #[test]
    fn test_separators_and_section_header() {
        let block = "3. 제재조치내용\n제재대상\t제재내용\n기관\t기관경고\n임원\t주의";
        let assessment = assess(block);
        assert!(assessment.signals.contains(&Signal::Separators));
        assert!(assessment.signals.contains(&Signal::SectionHeader));
        assert!(assessment.is_tabular());
    }

    #[test]
    fn test_pipe_rows() {
        let block = "| 기관 | 기관경고 |\n| 임원 | 주의 |";
        assert_eq!(assess(block).signals, vec![Signal::Separators]);
    }

    #[test]
    fn test_long_prose_is_narrative() {
        let block = "이 사건 금융기관은 고객의 투자성향을 확인하지 아니한 채 고위험 상품을 권유하였으며, \
                     내부통제기준에 따른 점검도 실시하지 아니하였다.";
        assert!(!is_tabular(block));
    }

    #[test]
    fn test_threshold_config() {
        let block = "가\n나\n다\n라\n마\n바";
        let config = ClassifierConfig::new().with_threshold(3);
        assert!(assess_with(block, &config).is_tabular());

        let config = ClassifierConfig::new().with_min_short_run(7);
        assert!(!assess_with(block, &config).signals.contains(&Signal::ShortLineRun));

        let config = ClassifierConfig::new().with_short_line_max_chars(1);
        assert_eq!(assess_with(block, &config).longest_short_run, 0);
    }

    #[test]
    fn test_empty_block() {
        let assessment = assess("");
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.layout, Layout::Narrative);
    }
}
