//! Participant record and the field-level edit vocabulary.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub identifier: String,
    pub phone: String,
    pub notes: String,
    pub attended: bool,
    pub received_stipend: bool,
    pub stipend_date: Option<String>,
    pub marked_by: Option<String>,
}

impl Participant {
    pub fn from_draft(draft: ParticipantDraft) -> Self {
        Self {
            id: new_id(),
            name: draft.name.trim().to_string(),
            identifier: draft.identifier,
            phone: draft.phone,
            notes: draft.notes,
            attended: draft.attended,
            received_stipend: draft.received_stipend,
            stipend_date: None,
            marked_by: None,
        }
    }

    /// Collapses empty optional text to `None`, matching what edits and CSV import produce.
    pub fn normalized(mut self) -> Self {
        self.stipend_date = self.stipend_date.and_then(optional_text);
        self.marked_by = self.marked_by.and_then(optional_text);
        self
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Applies a single field edit. A value of the wrong kind, or a blank name, leaves the
    /// record untouched.
    pub fn apply(&mut self, field: ParticipantField, value: FieldValue) -> bool {
        match (field, value) {
            (ParticipantField::Name, FieldValue::Text(text)) if !text.trim().is_empty() => {
                self.name = text
            }
            (ParticipantField::Identifier, FieldValue::Text(text)) => self.identifier = text,
            (ParticipantField::Phone, FieldValue::Text(text)) => self.phone = text,
            (ParticipantField::Notes, FieldValue::Text(text)) => self.notes = text,
            (ParticipantField::Attended, FieldValue::Flag(flag)) => self.attended = flag,
            (ParticipantField::ReceivedStipend, FieldValue::Flag(flag)) => {
                self.received_stipend = flag
            }
            (ParticipantField::StipendDate, FieldValue::Text(text)) => {
                self.stipend_date = optional_text(text)
            }
            (ParticipantField::StipendDate, FieldValue::Clear) => self.stipend_date = None,
            (ParticipantField::MarkedBy, FieldValue::Text(text)) => {
                self.marked_by = optional_text(text)
            }
            (ParticipantField::MarkedBy, FieldValue::Clear) => self.marked_by = None,
            _ => return false,
        }
        true
    }
}

/// Form input for a new participant; the id is minted on insert.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantDraft {
    pub name: String,
    pub identifier: String,
    pub phone: String,
    pub notes: String,
    pub attended: bool,
    pub received_stipend: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParticipantField {
    Name,
    Identifier,
    Phone,
    Notes,
    Attended,
    ReceivedStipend,
    StipendDate,
    MarkedBy,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
    Clear,
}

fn optional_text(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis())
}

pub fn new_id() -> String {
    format!("id-{}-{}", unix_millis(), Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_ids_are_distinct() {
        let first = new_id();
        let second = new_id();
        assert!(first.starts_with("id-"));
        assert_ne!(first, second);
    }

    #[test]
    fn draft_gets_fresh_id_and_defaults() {
        let participant = Participant::from_draft(ParticipantDraft {
            name: "  Ali  ".to_string(),
            ..ParticipantDraft::default()
        });
        assert_eq!(participant.name, "Ali");
        assert!(!participant.id.is_empty());
        assert!(!participant.attended);
        assert!(!participant.received_stipend);
        assert_eq!(participant.stipend_date, None);
        assert_eq!(participant.marked_by, None);
    }

    #[test]
    fn mismatched_value_kind_is_ignored() {
        let mut participant = Participant {
            id: "1".to_string(),
            name: "Ali".to_string(),
            ..Participant::default()
        };
        assert!(!participant.apply(ParticipantField::Attended, FieldValue::Text("yes".into())));
        assert!(!participant.apply(ParticipantField::Name, FieldValue::Flag(true)));
        assert!(!participant.apply(ParticipantField::Name, FieldValue::Text("  ".into())));
        assert!(!participant.attended);
        assert_eq!(participant.name, "Ali");

        assert!(participant.apply(ParticipantField::MarkedBy, FieldValue::Text("Sam".into())));
        assert_eq!(participant.marked_by.as_deref(), Some("Sam"));
        assert!(participant.apply(ParticipantField::MarkedBy, FieldValue::Clear));
        assert_eq!(participant.marked_by, None);
    }

    #[test]
    fn deserializes_camel_case_with_missing_fields() {
        let participant: Participant =
            serde_json::from_str(r#"{"id":"7","name":"Bea","receivedStipend":true}"#)
                .expect("participant");
        assert_eq!(participant.id, "7");
        assert!(participant.received_stipend);
        assert!(!participant.attended);
        assert_eq!(participant.phone, "");
    }

    #[test]
    fn normalized_drops_empty_optional_text() {
        let participant: Participant = serde_json::from_str(
            r#"{"id":"7","name":"Bea","stipendDate":"","markedBy":"Sam"}"#,
        )
        .expect("participant");
        let participant = participant.normalized();
        assert_eq!(participant.stipend_date, None);
        assert_eq!(participant.marked_by.as_deref(), Some("Sam"));
    }

    #[test]
    fn field_value_decodes_from_json() {
        let flag: FieldValue = serde_json::from_str("true").expect("flag");
        let text: FieldValue = serde_json::from_str("\"x\"").expect("text");
        let clear: FieldValue = serde_json::from_str("null").expect("clear");
        assert_eq!(flag, FieldValue::Flag(true));
        assert_eq!(text, FieldValue::Text("x".to_string()));
        assert_eq!(clear, FieldValue::Clear);
    }
}
