//! Line-level outline markers of the grounds section.
//!
//! Korean regulatory documents number their outline as `가.` → `(1)`/`⑴` →
//! `(가)`, or use bullet glyphs (`□` for items, `◦` for details). This module
//! classifies a single line by its leading marker; the incident parser
//! decides what each kind means in context.

use regex::Regex;
use std::sync::LazyLock;

static RE_GROUP_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[가나다라마바사아자차카타파하]\s*[._]\s*(?:문\s*책\s*사\s*항|책\s*임\s*사\s*항|자\s*율\s*처\s*리\s*필\s*요\s*사\s*항)(.*)$",
    )
    .unwrap()
});

static RE_ORDINAL_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([가나다라마바사아자차카타파하])\s*[._]\s*(.+)$").unwrap());

static RE_FIRST_ORDINAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^가\s*[._]").unwrap());

static RE_NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[\(（]\s*(\d+)\s*[\)）]|([⑴-⒇]))\s*(.+)$").unwrap()
});

static RE_BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*[\)）]\s*\S").unwrap());

static RE_LETTERED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\(（]\s*[가나다라마바사아자차카타파하]\s*[\)）]\s*(.*)$").unwrap()
});

static RE_SQUARE_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[□■▣▢]\s*(.+)$").unwrap());

static RE_ROUND_BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[◦○●◯]").unwrap());

static RE_RELATED_LAW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<\s*관\s*련\s*법\s*규\s*>").unwrap());

static RE_PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)|（[^）]*）").unwrap());

/// Kind of outline line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty or whitespace only
    Blank,
    /// `가. 문책사항` style grouping heading; carries the text after the phrase
    GroupHeading {
        /// Text after the group phrase
        trailing: &'a str,
    },
    /// `가. 제목` item
    OrdinalItem {
        /// Ordinal character
        ordinal: char,
        /// Item text
        title: &'a str,
    },
    /// `(1) 제목` or `⑴ 제목` item
    NumberedItem {
        /// Item number
        number: u32,
        /// Item text
        title: &'a str,
    },
    /// `1) ...` enumeration inside prose
    BareNumber,
    /// `(가) ...` lettered sub-item
    LetteredItem {
        /// Item text, possibly empty
        title: &'a str,
    },
    /// `□ 제목` bullet item
    SquareBullet {
        /// Item text
        title: &'a str,
    },
    /// `◦ ...` detail bullet
    RoundBullet,
    /// `<관련법규>` citation marker
    RelatedLaw,
    /// Anything else
    Text,
}

/// A trimmed line and its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineLine<'a> {
    /// Line text without surrounding whitespace
    pub text: &'a str,
    /// Classified kind
    pub kind: LineKind<'a>,
}

impl<'a> OutlineLine<'a> {
    /// Classifies a raw line.
    pub fn parse(raw: &'a str) -> Self {
        let text = raw.trim();
        Self {
            text,
            kind: classify_line(text),
        }
    }
}

/// Classifies a trimmed line by its leading marker.
///
/// Group headings are checked before plain ordinal items, and `(1)` style
/// numbers before lettered items.
pub fn classify_line(line: &str) -> LineKind<'_> {
    if line.is_empty() {
        return LineKind::Blank;
    }

    if let Some(caps) = RE_GROUP_HEADING.captures(line) {
        let trailing = caps.get(1).map_or("", |m| m.as_str());
        return LineKind::GroupHeading { trailing };
    }

    if let Some(caps) = RE_ORDINAL_ITEM.captures(line) {
        let ordinal = caps[1].chars().next().unwrap_or('가');
        let title = caps.get(2).map_or("", |m| m.as_str().trim());
        return LineKind::OrdinalItem { ordinal, title };
    }

    if RE_BARE_NUMBER.is_match(line) {
        return LineKind::BareNumber;
    }

    if let Some(caps) = RE_NUMBERED_ITEM.captures(line) {
        let number = match (caps.get(1), caps.get(2)) {
            (Some(digits), _) => digits.as_str().parse().unwrap_or(0),
            (None, Some(circled)) => circled_number(circled.as_str()),
            _ => 0,
        };
        let title = caps.get(3).map_or("", |m| m.as_str().trim());
        return LineKind::NumberedItem { number, title };
    }

    if let Some(caps) = RE_LETTERED_ITEM.captures(line) {
        let title = caps.get(1).map_or("", |m| m.as_str().trim());
        return LineKind::LetteredItem { title };
    }

    if let Some(caps) = RE_SQUARE_BULLET.captures(line) {
        let title = caps.get(1).map_or("", |m| m.as_str().trim());
        return LineKind::SquareBullet { title };
    }

    if RE_ROUND_BULLET.is_match(line) {
        return LineKind::RoundBullet;
    }

    if RE_RELATED_LAW.is_match(line) {
        return LineKind::RelatedLaw;
    }

    LineKind::Text
}

/// Number of a parenthesized digit `⑴`..`⒇`.
fn circled_number(marker: &str) -> u32 {
    marker
        .chars()
        .next()
        .map_or(0, |c| (c as u32).saturating_sub('⑴' as u32) + 1)
}

/// Returns true if the line opens a `가.` outline.
pub fn is_first_ordinal(line: &str) -> bool {
    RE_FIRST_ORDINAL.is_match(line.trim())
}

/// Parent title carried by a group heading: the trailing text without
/// parentheticals or leading punctuation.
pub fn group_parent_title(trailing: &str) -> String {
    RE_PARENTHETICAL
        .replace_all(trailing, "")
        .trim()
        .trim_start_matches([':', '-', '·', '：'])
        .trim()
        .to_string()
}
