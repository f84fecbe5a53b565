//! Application state and the reducer that drives it.

use std::collections::HashSet;

use serde::Serialize;

use crate::participant::{FieldValue, Participant, ParticipantDraft, ParticipantField};
use crate::store::{ImportMode, RecordStore};
use crate::view::{counts, filter_participants, FilterMode, RosterCounts};

#[derive(Debug, Clone)]
pub enum Action {
    Add(ParticipantDraft),
    UpdateField {
        id: String,
        field: ParticipantField,
        value: FieldValue,
    },
    Remove(HashSet<String>),
    Import {
        records: Vec<Participant>,
        mode: ImportMode,
    },
    SetSearch(String),
    SetFilter(FilterMode),
}

impl Action {
    pub fn mutates_records(&self) -> bool {
        !matches!(self, Action::SetSearch(_) | Action::SetFilter(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub participants: RecordStore,
    pub search: String,
    pub filter: FilterMode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterView {
    pub participants: Vec<Participant>,
    pub search: String,
    pub filter: FilterMode,
    pub counts: RosterCounts,
}

impl AppState {
    pub fn new(participants: RecordStore) -> Self {
        Self {
            participants,
            ..Self::default()
        }
    }

    pub fn view(&self) -> RosterView {
        let records = self.participants.records();
        RosterView {
            participants: filter_participants(records, self.search.as_str(), self.filter)
                .into_iter()
                .cloned()
                .collect(),
            search: self.search.clone(),
            filter: self.filter,
            counts: counts(records),
        }
    }
}

/// Pure transition. A rejected add (blank name) leaves the state unchanged.
pub fn reduce(state: AppState, action: Action) -> AppState {
    let mut next = state;
    match action {
        Action::Add(draft) => {
            if let Err(err) = next.participants.add(draft) {
                tracing::debug!(error = %err, "ignored add");
            }
        }
        Action::UpdateField { id, field, value } => {
            next.participants.update_field(id.as_str(), field, value);
        }
        Action::Remove(ids) => {
            next.participants.remove(&ids);
        }
        Action::Import { records, mode } => {
            next.participants.import(records, mode);
        }
        Action::SetSearch(search) => next.search = search,
        Action::SetFilter(filter) => next.filter = filter,
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(state: AppState, name: &str, paid: bool) -> AppState {
        reduce(
            state,
            Action::Add(ParticipantDraft {
                name: name.to_string(),
                received_stipend: paid,
                ..ParticipantDraft::default()
            }),
        )
    }

    #[test]
    fn add_prepends_and_blank_add_is_ignored() {
        let state = add(AppState::default(), "Ali", false);
        let state = add(state, "Bea", true);
        let state = add(state, " ", false);
        let names: Vec<&str> = state
            .participants
            .records()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bea", "Ali"]);
    }

    #[test]
    fn view_applies_search_and_filter_but_counts_everything() {
        let state = add(AppState::default(), "Ali", true);
        let state = add(state, "Alina", false);
        let state = add(state, "Bea", true);
        let state = reduce(state, Action::SetSearch("ALI".to_string()));
        let state = reduce(state, Action::SetFilter(FilterMode::Paid));

        let view = state.view();
        assert_eq!(view.participants.len(), 1);
        assert_eq!(view.participants[0].name, "Ali");
        assert_eq!(view.counts.total_count, 3);
        assert_eq!(view.counts.paid_count, 2);
        assert_eq!(view.counts.unpaid_count, 1);
    }

    #[test]
    fn update_field_targets_one_record() {
        let state = add(AppState::default(), "Ali", false);
        let state = add(state, "Bea", false);
        let id = state.participants.records()[1].id.clone();
        let state = reduce(
            state,
            Action::UpdateField {
                id: id.clone(),
                field: ParticipantField::Attended,
                value: FieldValue::Flag(true),
            },
        );
        let attended: Vec<bool> = state
            .participants
            .records()
            .iter()
            .map(|p| p.attended)
            .collect();
        assert_eq!(attended, vec![false, true]);
        assert_eq!(state.participants.get(&id).map(|p| p.name.as_str()), Some("Ali"));
    }

    #[test]
    fn query_actions_do_not_mutate_records() {
        assert!(!Action::SetSearch(String::new()).mutates_records());
        assert!(!Action::SetFilter(FilterMode::All).mutates_records());
        assert!(Action::Remove(HashSet::new()).mutates_records());
    }
}
