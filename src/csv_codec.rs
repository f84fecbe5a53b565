//! CSV export and import for the participant collection.

use std::collections::HashMap;

use crate::participant::{new_id, Participant};

pub const CSV_COLUMNS: [&str; 9] = [
    "id",
    "name",
    "identifier",
    "phone",
    "attended",
    "receivedStipend",
    "stipendDate",
    "markedBy",
    "notes",
];

const DATA_URI_PREFIX: &str = "data:text/csv;charset=utf-8,";
pub const DEFAULT_EXPORT_NAME: &str = "participants.csv";

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn flag_string(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn participant_cells(participant: &Participant) -> [&str; 9] {
    [
        participant.id.as_str(),
        participant.name.as_str(),
        participant.identifier.as_str(),
        participant.phone.as_str(),
        flag_string(participant.attended),
        flag_string(participant.received_stipend),
        participant.stipend_date.as_deref().unwrap_or(""),
        participant.marked_by.as_deref().unwrap_or(""),
        participant.notes.as_str(),
    ]
}

pub fn to_csv(participants: &[Participant]) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(participants.len() + 1);
    lines.push(CSV_COLUMNS.join(","));
    for participant in participants {
        let line = participant_cells(participant)
            .iter()
            .map(|cell| csv_escape(cell))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }
    lines.join("\n")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Unquoted,
    Quoted,
}

/// Splits text into records on line breaks outside quotes. A trailing `\r` is dropped
/// from each record and empty records are skipped.
fn split_records(text: &str) -> Vec<&str> {
    let mut records = Vec::new();
    let mut state = ScanState::Unquoted;
    let mut start = 0;

    for (index, ch) in text.char_indices() {
        match (state, ch) {
            (ScanState::Unquoted, '"') => state = ScanState::Quoted,
            (ScanState::Quoted, '"') => state = ScanState::Unquoted,
            (ScanState::Unquoted, '\n') => {
                records.push(&text[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    records.push(&text[start..]);

    records
        .into_iter()
        .map(|record| record.strip_suffix('\r').unwrap_or(record))
        .filter(|record| !record.is_empty())
        .collect()
}

/// Splits one record into cells. Never fails: an unmatched quote runs to the end of the record.
fn split_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut state = ScanState::Unquoted;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            ScanState::Quoted => {
                if ch == '"' {
                    if chars.peek() == Some(&'"') {
                        current.push('"');
                        chars.next();
                    } else {
                        state = ScanState::Unquoted;
                    }
                } else {
                    current.push(ch);
                }
            }
            ScanState::Unquoted => match ch {
                ',' => cells.push(std::mem::take(&mut current)),
                '"' => state = ScanState::Quoted,
                _ => current.push(ch),
            },
        }
    }
    cells.push(current);
    cells
}

fn parse_flag(raw: &str) -> bool {
    raw == "1" || raw.eq_ignore_ascii_case("true")
}

fn nonempty(raw: String) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw)
    }
}

struct HeaderIndex(HashMap<String, usize>);

impl HeaderIndex {
    fn new(header: &str) -> Self {
        let mut lookup = HashMap::new();
        for (index, name) in split_line(header).into_iter().enumerate() {
            lookup.entry(name.trim().to_string()).or_insert(index);
        }
        Self(lookup)
    }

    fn cell(&self, cells: &[String], column: &str) -> String {
        self.0
            .get(column)
            .and_then(|index| cells.get(*index))
            .cloned()
            .unwrap_or_default()
    }
}

pub fn from_csv(text: &str) -> Vec<Participant> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = split_records(text).into_iter();
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns = HeaderIndex::new(header);

    let mut participants = Vec::new();
    let mut dropped = 0_usize;
    for record in lines {
        let cells = split_line(record);
        let name = columns.cell(&cells, "name");
        if name.trim().is_empty() {
            dropped += 1;
            continue;
        }
        let id = columns.cell(&cells, "id");
        participants.push(Participant {
            id: if id.is_empty() { new_id() } else { id },
            name,
            identifier: columns.cell(&cells, "identifier"),
            phone: columns.cell(&cells, "phone"),
            notes: columns.cell(&cells, "notes"),
            attended: parse_flag(columns.cell(&cells, "attended").as_str()),
            received_stipend: parse_flag(columns.cell(&cells, "receivedStipend").as_str()),
            stipend_date: nonempty(columns.cell(&cells, "stipendDate")),
            marked_by: nonempty(columns.cell(&cells, "markedBy")),
        });
    }
    if dropped > 0 {
        tracing::debug!(dropped, "skipped csv rows without a name");
    }
    participants
}

pub fn csv_data_uri(csv: &str) -> String {
    format!("{DATA_URI_PREFIX}{}", urlencoding::encode(csv))
}

fn sanitize_filename(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|ch| match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => ch,
            _ => '_',
        })
        .collect();
    match replaced.trim_matches('_') {
        "" => DEFAULT_EXPORT_NAME.to_string(),
        name => name.to_string(),
    }
}

pub fn export_filename(value: &str) -> String {
    let safe = sanitize_filename(value.trim());
    if safe.to_lowercase().ends_with(".csv") {
        safe
    } else {
        format!("{safe}.csv")
    }
}

#[cfg(test)]
#[path = "tests/csv_codec_tests.rs"]
mod tests;
