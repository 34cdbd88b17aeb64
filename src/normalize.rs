//! # Text Normalizer
//!
//! Repairs the damage PDF text layers and OCR do to sanction notices before
//! any structural parsing runs.
//!
//! ## Pipeline Stages
//!
//! 1. **Unicode** - control character removal, fullwidth folding, NFC composition
//! 2. **Page numbers** - `- 3 -` lines and inline occurrences
//! 3. **Whitespace** - space runs and blank-line runs
//! 4. **Syllable collapse** - `제 재 대 상` becomes `제재대상`
//! 5. **Known errors** - fixed table of OCR misreadings
//!
//! No stage produces input for an earlier stage, so [`normalize`] is idempotent.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Minimum number of space-separated single syllables that form a split word.
const MIN_SYLLABLE_RUN: usize = 3;

/// Normalizer configuration options
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Stage 1: control characters, fullwidth forms, NFC
    pub unicode: bool,
    /// Stage 2: page-number artifacts
    pub page_numbers: bool,
    /// Stage 3: space and blank-line runs
    pub squeeze_whitespace: bool,
    /// Stage 4: OCR-split syllable runs
    pub collapse_syllables: bool,
    /// Stage 5: known OCR misreadings
    pub known_errors: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            unicode: true,
            page_numbers: true,
            squeeze_whitespace: true,
            collapse_syllables: true,
            known_errors: true,
        }
    }
}

impl NormalizeOptions {
    /// Creates options with every stage enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for minimal normalization (unicode and page numbers only)
    pub fn minimal() -> Self {
        Self {
            unicode: true,
            page_numbers: true,
            squeeze_whitespace: false,
            collapse_syllables: false,
            known_errors: false,
        }
    }

    /// Disables syllable-space collapsing.
    pub fn without_syllable_collapse(mut self) -> Self {
        self.collapse_syllables = false;
        self
    }

    /// Disables the known-error substitution table.
    pub fn without_known_errors(mut self) -> Self {
        self.known_errors = false;
        self
    }

    /// Disables whitespace squeezing.
    pub fn without_whitespace_squeeze(mut self) -> Self {
        self.squeeze_whitespace = false;
        self
    }
}

/// Normalizes extracted text with all stages enabled.
///
/// # Example
///
/// ```
/// use sanction_notice::normalize;
///
/// let text = "1. 금 융 기 관 명 : 테스트은행\n- 2 -\n";
/// assert_eq!(normalize(text), "1. 금융기관명 : 테스트은행\n");
/// ```
pub fn normalize(text: &str) -> String {
    normalize_with(text, &NormalizeOptions::default())
}

/// Normalizes extracted text with the given options.
pub fn normalize_with(text: &str, options: &NormalizeOptions) -> String {
    let mut result = if options.unicode {
        normalize_unicode(text)
    } else {
        text.to_string()
    };

    if options.page_numbers {
        result = remove_page_numbers(&result);
    }

    if options.squeeze_whitespace {
        result = squeeze_whitespace(&result);
    }

    if options.collapse_syllables {
        result = collapse_split_syllables(&result);
    }

    if options.known_errors {
        result = fix_known_errors(&result);
    }

    result
}

// ============================================================================
// Stage 1: Unicode
// ============================================================================

/// Stage 1: control characters, line endings, fullwidth forms, NFC.
///
/// Characters are filtered and folded before composition; composing first
/// would let a removed character separate jamo that only compose on a
/// second pass.
pub fn normalize_unicode(input: &str) -> String {
    let unified = input.replace("\r\n", "\n").replace('\r', "\n");
    unified
        .chars()
        .filter(|&c| !is_control_char(c))
        .map(|c| normalize_fullwidth(c).unwrap_or(c))
        .nfc()
        .collect()
}

/// Check if character is a control character that should be removed
fn is_control_char(c: char) -> bool {
    matches!(
        c,
        '\0'        // Null
        | '\x0B'    // Vertical Tab
        | '\x0C'    // Form Feed
        | '\u{FEFF}' // BOM
        | '\u{FFFD}' // Replacement character
        | '\u{00AD}' // Soft hyphen
        | '\u{200B}' // Zero width space
    )
}

/// Fold fullwidth ASCII and the ideographic space to their ASCII forms.
fn normalize_fullwidth(c: char) -> Option<char> {
    match c {
        '\u{3000}' => Some(' '),
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFF01 + 0x21),
        _ => None,
    }
}

// ============================================================================
// Stage 2: Page Numbers
// ============================================================================

static RE_PAGE_NUMBER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*\d+\s*-\s*$").unwrap());

static RE_INLINE_PAGE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(?:^|[ \t]+)-[ \t]*\d{1,4}[ \t]*-(?:[ \t]+|$)").unwrap());

/// Returns true if the line is nothing but a dash-delimited page number.
pub fn is_page_number_line(line: &str) -> bool {
    RE_PAGE_NUMBER_LINE.is_match(line)
}

/// Removes `- N -` page-number lines and collapses inline occurrences to a
/// single space.
///
/// An inline occurrence right after a digit is part of a dash-spaced date or
/// number (`2024 - 5 - 15`) and is kept. Runs to a fixed point: removing one
/// inline occurrence can expose another.
pub fn remove_page_numbers(text: &str) -> String {
    let mut current = drop_page_number_lines(text);
    loop {
        let mut collapsed = false;
        let replaced = RE_INLINE_PAGE_NUMBER.replace_all(&current, |caps: &Captures| {
            let start = caps.get(0).map_or(0, |m| m.start());
            if follows_digit(&current[..start]) {
                caps[0].to_string()
            } else {
                collapsed = true;
                " ".to_string()
            }
        });
        if !collapsed {
            break;
        }
        let replaced = replaced.into_owned();
        current = drop_page_number_lines(&replaced);
    }
    current
}

fn follows_digit(before: &str) -> bool {
    before.chars().next_back().is_some_and(|c| c.is_ascii_digit())
}

fn drop_page_number_lines(text: &str) -> String {
    text.split('\n')
        .filter(|line| !is_page_number_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Stage 3: Whitespace
// ============================================================================

static RE_SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

static RE_BLANK_LINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").unwrap());

/// Stage 3: collapse space runs and runs of blank lines.
pub fn squeeze_whitespace(text: &str) -> String {
    let spaces = RE_SPACE_RUN.replace_all(text, " ");
    RE_BLANK_LINE_RUN.replace_all(&spaces, "\n\n").into_owned()
}

// ============================================================================
// Stage 4: Syllable Collapse
// ============================================================================

/// Joins runs of three or more single Hangul syllables separated by single
/// spaces, line by line.
///
/// ```
/// use sanction_notice::normalize::collapse_split_syllables;
///
/// assert_eq!(collapse_split_syllables("4. 제 재 대 상 사 실"), "4. 제재대상사실");
/// assert_eq!(collapse_split_syllables("기 관 주의"), "기 관 주의");
/// ```
pub fn collapse_split_syllables(text: &str) -> String {
    text.split('\n')
        .map(collapse_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn collapse_line(line: &str) -> Cow<'_, str> {
    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() < MIN_SYLLABLE_RUN {
        return Cow::Borrowed(line);
    }

    let mut out: Vec<Cow<'_, str>> = Vec::with_capacity(tokens.len());
    let mut changed = false;
    let mut i = 0;
    while i < tokens.len() {
        let run_end = tokens[i..]
            .iter()
            .position(|t| !is_single_syllable(t))
            .map_or(tokens.len(), |p| i + p);

        if run_end - i >= MIN_SYLLABLE_RUN {
            out.push(Cow::Owned(tokens[i..run_end].concat()));
            changed = true;
            i = run_end;
        } else if run_end > i {
            out.extend(tokens[i..run_end].iter().map(|t| Cow::Borrowed(*t)));
            i = run_end;
        } else {
            out.push(Cow::Borrowed(tokens[i]));
            i += 1;
        }
    }

    if changed {
        Cow::Owned(out.join(" "))
    } else {
        Cow::Borrowed(line)
    }
}

/// Returns true if the token is exactly one precomposed Hangul syllable.
fn is_single_syllable(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if is_hangul_syllable(c))
}

/// Returns true for precomposed Hangul syllables (가..힣).
pub(crate) fn is_hangul_syllable(c: char) -> bool {
    ('가'..='힣').contains(&c)
}

// ============================================================================
// Stage 5: Known OCR Errors
// ============================================================================

/// OCR misreadings observed on scanned notices. Spaced forms come first so
/// they win when syllable collapsing is disabled.
const KNOWN_OCR_ERRORS: &[(&str, &str)] = &[
    ("오 혐 설 계 사", "보험설계사"),
    ("로 혐 설 계 사", "보험설계사"),
    ("견 무 정 지", "업무정지"),
    ("오혐설계사", "보험설계사"),
    ("로혐설계사", "보험설계사"),
    ("견무정지", "업무정지"),
];

/// Stage 5: replace known OCR misreadings with their correct forms.
pub fn fix_known_errors(text: &str) -> String {
    let mut result = text.to_string();
    for (wrong, right) in KNOWN_OCR_ERRORS {
        if result.contains(wrong) {
            result = result.replace(wrong, right);
        }
    }
    result
}

// ============================================================================
// Sanction Content Artifacts
// ============================================================================

static RE_TABLE_BORDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_\s*[｜|]\s*-\s*").unwrap());

static RE_ISOLATED_JAMO_BAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)ㅣ(?:\s|$)").unwrap());

static RE_ANY_WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Spaced renderings of sanction keywords and their joined forms.
static SPACED_KEYWORDS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"등\s+록\s*취\s*소|등\s*록\s+취\s*소|등\s*록\s*취\s+소", "등록취소"),
        (r"업\s+무\s*정\s*지|업\s*무\s+정\s*지|업\s*무\s*정\s+지", "업무정지"),
        (r"과\s+태\s*료|과\s*태\s+료", "과태료"),
        (r"견\s+책", "견책"),
        (r"감\s+봉", "감봉"),
    ]
    .into_iter()
    .map(|(pattern, joined)| (Regex::new(pattern).unwrap(), joined))
    .collect()
});

/// Cleans OCR table debris out of an extracted sanction content string.
///
/// Removes `_ | -` border fragments, backticks and isolated `ㅣ` bars,
/// squeezes whitespace and rejoins spaced sanction keywords.
pub fn clean_content_artifacts(content: &str) -> String {
    let mut result = RE_TABLE_BORDER.replace_all(content, "").into_owned();
    result = result.replace('`', "");
    result = RE_ISOLATED_JAMO_BAR.replace_all(&result, " ").into_owned();
    result = RE_ANY_WHITESPACE_RUN.replace_all(&result, " ").into_owned();

    for (pattern, joined) in SPACED_KEYWORDS.iter() {
        result = pattern.replace_all(&result, *joined).into_owned();
    }

    result
        .trim()
        .trim_start_matches(['-', '·', '.', ' '])
        .trim()
        .to_string()
}
