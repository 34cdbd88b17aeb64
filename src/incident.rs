//! Incident hierarchy parser for the grounds section.
//!
//! The grounds section (`4. 제재대상사실`) lists discrete findings nested up
//! to three levels deep:
//!
//! ```text
//! 가. 문책사항                  <- group heading, no incident of its own
//! (1) 투자자 보호의무 위반       <- incident
//! (가) 고객 정보 미확인          <- folded into the title of (1)
//! 설명                          <- body
//! ```
//!
//! Parsing is an explicit state machine: [`transition`] is a pure function
//! from a [`ParserState`] and one classified line to the next state and an
//! optionally completed [`Incident`]. [`IncidentParser`] drives it over the
//! lines of a section.

use crate::model::Incident;
use crate::normalize::remove_page_numbers;
use crate::outline::{group_parent_title, is_first_ordinal, LineKind, OutlineLine};
use crate::section::narrative_section;

/// How the open incident was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenedBy {
    /// `가.` item
    Ordinal,
    /// `(1)` or `⑴` item
    Numbered,
    /// `□` bullet
    Bullet,
}

/// An incident that is still collecting body lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenIncident {
    /// Current title
    pub title: String,
    /// Body lines collected so far
    pub body: Vec<String>,
    /// Marker that opened the incident
    pub opened_by: OpenedBy,
    /// A lettered sub-item has already been folded into the title
    pub folded_sub_item: bool,
}

impl OpenIncident {
    fn new(title: String, opened_by: OpenedBy) -> Self {
        Self {
            title,
            body: Vec::new(),
            opened_by,
            folded_sub_item: false,
        }
    }

    /// Finishes the incident: body joined with `\n`, page numbers stripped.
    pub fn close(self) -> Incident {
        let body = remove_page_numbers(self.body.join("\n").trim());
        Incident {
            title: self.title,
            body: body.trim().to_string(),
        }
    }
}

/// Whether an incident is open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// No open incident; lines are preamble
    #[default]
    Idle,
    /// Collecting an incident
    InIncident(OpenIncident),
}

/// Full parser state between lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParserState {
    /// Open incident, if any
    pub phase: Phase,
    /// Title of the enclosing `가.` item or group heading
    pub parent_title: String,
    /// The section has no `가.` outline, so `□` bullets open incidents
    pub bullet_mode: bool,
}

impl ParserState {
    /// Creates the initial state.
    pub fn new(bullet_mode: bool) -> Self {
        Self {
            phase: Phase::Idle,
            parent_title: String::new(),
            bullet_mode,
        }
    }

    /// Flushes the open incident at end of section.
    pub fn finish(self) -> Option<Incident> {
        match self.phase {
            Phase::InIncident(open) => Some(open.close()),
            Phase::Idle => None,
        }
    }

    fn close_open(&mut self) -> Option<Incident> {
        match std::mem::take(&mut self.phase) {
            Phase::InIncident(open) => Some(open.close()),
            Phase::Idle => None,
        }
    }

    fn append_body(&mut self, line: &str) {
        if let Phase::InIncident(open) = &mut self.phase {
            open.body.push(line.to_string());
        }
    }
}

/// Joins a parent and a sub title as `"parent - sub"`, or returns the sub
/// title when there is no parent.
fn compose_title(parent: &str, sub: &str) -> String {
    if parent.is_empty() {
        sub.to_string()
    } else {
        format!("{} - {}", parent, sub)
    }
}

/// Applies one line to the state.
///
/// Returns the next state and the incident completed by this line, if any.
pub fn transition(mut state: ParserState, line: &OutlineLine<'_>) -> (ParserState, Option<Incident>) {
    match line.kind {
        LineKind::Blank => (state, None),

        LineKind::GroupHeading { trailing } => {
            let emitted = state.close_open();
            state.parent_title = group_parent_title(trailing);
            (state, emitted)
        }

        LineKind::OrdinalItem { title, .. } => {
            let emitted = state.close_open();
            state.parent_title = title.to_string();
            state.phase = Phase::InIncident(OpenIncident::new(title.to_string(), OpenedBy::Ordinal));
            (state, emitted)
        }

        LineKind::NumberedItem { title, .. } => {
            let parent = state.parent_title.clone();
            let title = compose_title(&parent, title);

            // (1) directly under 가. refines that item instead of opening a sibling
            if let Phase::InIncident(open) = &mut state.phase {
                if !parent.is_empty() && open.opened_by == OpenedBy::Ordinal && open.title == parent {
                    open.title = title;
                    open.body.clear();
                    open.opened_by = OpenedBy::Numbered;
                    return (state, None);
                }
            }

            let emitted = state.close_open();
            state.phase = Phase::InIncident(OpenIncident::new(title, OpenedBy::Numbered));
            (state, emitted)
        }

        LineKind::LetteredItem { title } => {
            if let Phase::InIncident(open) = &mut state.phase {
                if open.opened_by == OpenedBy::Numbered
                    && open.body.is_empty()
                    && !open.folded_sub_item
                    && !title.is_empty()
                {
                    open.title = compose_title(&open.title, title);
                    open.folded_sub_item = true;
                } else {
                    open.body.push(line.text.to_string());
                }
            }
            (state, None)
        }

        LineKind::SquareBullet { title } if state.bullet_mode => {
            let emitted = state.close_open();
            state.phase = Phase::InIncident(OpenIncident::new(title.to_string(), OpenedBy::Bullet));
            (state, emitted)
        }

        LineKind::BareNumber
        | LineKind::RoundBullet
        | LineKind::RelatedLaw
        | LineKind::SquareBullet { .. }
        | LineKind::Text => {
            state.append_body(line.text);
            (state, None)
        }
    }
}

/// Drives [`transition`] over the lines of a section.
#[derive(Debug)]
pub struct IncidentParser<'a> {
    lines: Vec<OutlineLine<'a>>,
    bullet_mode: bool,
}

impl<'a> IncidentParser<'a> {
    /// Prepares a parser for the given section text.
    pub fn new(section: &'a str) -> Self {
        let bullet_mode = !section.lines().any(is_first_ordinal);
        Self {
            lines: section.lines().map(OutlineLine::parse).collect(),
            bullet_mode,
        }
    }

    /// Returns true if `□` bullets open incidents in this section.
    pub fn bullet_mode(&self) -> bool {
        self.bullet_mode
    }

    /// Runs the state machine and returns the incidents in document order.
    pub fn parse(self) -> Vec<Incident> {
        let mut incidents = Vec::new();
        let mut state = ParserState::new(self.bullet_mode);

        for line in &self.lines {
            let (next, emitted) = transition(state, line);
            state = next;
            incidents.extend(emitted);
        }
        incidents.extend(state.finish());

        tracing::debug!(count = incidents.len(), bullet_mode = self.bullet_mode, "incidents parsed");
        incidents
    }
}

/// Extracts the incidents of a notice.
///
/// Parses the grounds section when its heading is present and the whole text
/// otherwise.
///
/// # Example
///
/// ```
/// use sanction_notice::extract_incidents;
///
/// let incidents = extract_incidents("가. 문책사항\n(1) 직무 관련 정보의 이용 금지 위반\n내용입니다");
/// assert_eq!(incidents.len(), 1);
/// assert_eq!(incidents[0].title, "직무 관련 정보의 이용 금지 위반");
/// assert_eq!(incidents[0].body, "내용입니다");
/// ```
pub fn extract_incidents(text: &str) -> Vec<Incident> {
    if text.starts_with('[') {
        return Vec::new();
    }

    let section = narrative_section(text).unwrap_or(text);
    IncidentParser::new(section).parse()
}
