use crate::error::{StoreError, StoreResult};
use crate::participant::ParticipantDraft;
use crate::state::{reduce, Action, AppState, RosterView};
use crate::store::{RecordStore, StorageSlot};

/// Owns the application state and persists the collection after every record mutation.
pub struct Roster {
    state: AppState,
    slot: StorageSlot,
}

impl Roster {
    pub fn open(slot: StorageSlot) -> Self {
        let state = AppState::new(RecordStore::load(&slot));
        Self { state, slot }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn slot(&self) -> &StorageSlot {
        &self.slot
    }

    pub fn view(&self) -> RosterView {
        self.state.view()
    }

    pub fn dispatch(&mut self, action: Action) -> StoreResult<()> {
        let persist = action.mutates_records();
        tracing::debug!(?action, "dispatch");
        self.state = reduce(std::mem::take(&mut self.state), action);
        if persist {
            self.state.participants.save(&self.slot)?;
        }
        Ok(())
    }

    /// Adds through the reducer and returns the id minted for the new, first record.
    pub fn add(&mut self, draft: ParticipantDraft) -> StoreResult<String> {
        if draft.name.trim().is_empty() {
            return Err(StoreError::BlankName);
        }
        self.dispatch(Action::Add(draft))?;
        self.state
            .participants
            .records()
            .first()
            .map(|participant| participant.id.clone())
            .ok_or(StoreError::BlankName)
    }
}
