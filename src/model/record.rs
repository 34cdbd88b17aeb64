//! Flattened record form of an extracted document.

use super::document::{
    or_sentinel, Incident, SanctionDocument, FIELD_BODY, FIELD_TITLE, SENTINEL,
};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Serialized form of a [`SanctionDocument`]: every field is populated,
/// unknown values are `"-"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanctionRecord {
    /// Institution or `"-"`
    #[serde(rename = "금융회사명")]
    pub institution: String,
    /// Sanction date or `"-"`
    #[serde(rename = "제재조치일")]
    pub sanction_date: String,
    /// Pipe-joined subjects or `"-"`
    #[serde(rename = "제재대상")]
    pub subjects: String,
    /// `" | "`-joined contents or `"-"`
    #[serde(rename = "제재내용")]
    pub sanctions: String,
    /// Incidents as positional `제목N`/`내용N` keys
    #[serde(flatten)]
    pub incidents: PositionalIncidents,
    /// Labels of fields that fell back to `"-"`, comma-joined, or `"-"`
    #[serde(rename = "누락필드")]
    pub missing_fields: String,
}

impl SanctionRecord {
    /// Builds the record for a document.
    pub fn from_document(document: &SanctionDocument) -> Self {
        Self {
            institution: or_sentinel(document.institution.clone()),
            sanction_date: or_sentinel(document.sanction_date.clone()),
            subjects: document.subjects_field(),
            sanctions: document.sanctions_field(),
            incidents: PositionalIncidents(document.incidents.clone()),
            missing_fields: or_sentinel(document.missing_fields().join(", ")),
        }
    }
}

/// Incidents serialized as `제목1, 내용1, 제목2, 내용2, ...` in order.
///
/// Without incidents a single `제목1`/`내용1` pair of sentinels is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionalIncidents(pub Vec<Incident>);

impl PositionalIncidents {
    /// Returns the `(key, value)` entries in output order.
    pub fn entries(&self) -> Vec<(String, String)> {
        if self.0.is_empty() {
            return vec![
                (format!("{}1", FIELD_TITLE), SENTINEL.to_string()),
                (format!("{}1", FIELD_BODY), SENTINEL.to_string()),
            ];
        }

        self.0
            .iter()
            .enumerate()
            .flat_map(|(i, incident)| {
                [
                    (format!("{}{}", FIELD_TITLE, i + 1), or_sentinel(incident.title.clone())),
                    (format!("{}{}", FIELD_BODY, i + 1), or_sentinel(incident.body.clone())),
                ]
            })
            .collect()
    }
}

impl Serialize for PositionalIncidents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in &entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
