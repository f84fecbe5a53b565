//! Search, filter and counters over the participant collection.

use serde::{Deserialize, Serialize};

use crate::participant::Participant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Unpaid,
    Paid,
    Attended,
}

impl FilterMode {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "unpaid" => FilterMode::Unpaid,
            "paid" => FilterMode::Paid,
            "attended" => FilterMode::Attended,
            _ => FilterMode::All,
        }
    }

    fn admits(self, participant: &Participant) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Unpaid => !participant.received_stipend,
            FilterMode::Paid => participant.received_stipend,
            FilterMode::Attended => participant.attended,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterCounts {
    pub total_count: usize,
    pub paid_count: usize,
    pub attended_count: usize,
    pub unpaid_count: usize,
}

pub fn counts(participants: &[Participant]) -> RosterCounts {
    let paid_count = participants.iter().filter(|p| p.received_stipend).count();
    RosterCounts {
        total_count: participants.len(),
        paid_count,
        attended_count: participants.iter().filter(|p| p.attended).count(),
        unpaid_count: participants.len() - paid_count,
    }
}

fn matches_query(participant: &Participant, needle: &str) -> bool {
    [
        participant.name.as_str(),
        participant.identifier.as_str(),
        participant.phone.as_str(),
        participant.notes.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

pub fn filter_participants<'a>(
    participants: &'a [Participant],
    query: &str,
    mode: FilterMode,
) -> Vec<&'a Participant> {
    let needle = query.trim().to_lowercase();
    participants
        .iter()
        .filter(|participant| mode.admits(participant))
        .filter(|participant| needle.is_empty() || matches_query(participant, needle.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(name: &str, attended: bool, paid: bool) -> Participant {
        Participant {
            id: name.to_lowercase(),
            name: name.to_string(),
            attended,
            received_stipend: paid,
            ..Participant::default()
        }
    }

    fn roster() -> Vec<Participant> {
        let mut notes_hit = participant("Zed", true, true);
        notes_hit.notes = "Cousin of ALIce".to_string();
        vec![
            participant("Ali", true, true),
            participant("Alina", false, false),
            participant("Bea", true, false),
            notes_hit,
        ]
    }

    fn names(view: Vec<&Participant>) -> Vec<&str> {
        view.into_iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn blank_query_matches_everything() {
        let roster = roster();
        assert_eq!(filter_participants(&roster, "   ", FilterMode::All).len(), 4);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let roster = roster();
        let mut with_phone = participant("Cy", false, false);
        with_phone.phone = "555-ALI".to_string();
        let mut all = roster.clone();
        all.push(with_phone);
        assert_eq!(
            names(filter_participants(&all, "ali", FilterMode::All)),
            vec!["Ali", "Alina", "Zed", "Cy"]
        );
    }

    #[test]
    fn search_combines_with_paid_filter() {
        let roster = roster();
        assert_eq!(
            names(filter_participants(&roster, "ali", FilterMode::Paid)),
            vec!["Ali", "Zed"]
        );
    }

    #[test]
    fn filter_modes_are_exclusive() {
        let roster = roster();
        assert_eq!(
            names(filter_participants(&roster, "", FilterMode::Unpaid)),
            vec!["Alina", "Bea"]
        );
        assert_eq!(
            names(filter_participants(&roster, "", FilterMode::Attended)),
            vec!["Ali", "Bea", "Zed"]
        );
    }

    #[test]
    fn counts_ignore_the_current_view() {
        let roster = roster();
        let totals = counts(&roster);
        assert_eq!(totals.total_count, 4);
        assert_eq!(totals.paid_count, 2);
        assert_eq!(totals.attended_count, 3);
        assert_eq!(totals.unpaid_count, 2);
        assert_eq!(totals.total_count, totals.paid_count + totals.unpaid_count);
        assert_eq!(counts(&[]), RosterCounts::default());
    }

    #[test]
    fn unknown_filter_name_falls_back_to_all() {
        assert_eq!(FilterMode::parse("Paid"), FilterMode::Paid);
        assert_eq!(FilterMode::parse("everyone"), FilterMode::All);
    }
}
