//! Ordered participant collection mirrored to a single storage slot.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::participant::{FieldValue, Participant, ParticipantDraft, ParticipantField};

pub const STORAGE_KEY: &str = "stipend-roster.participants.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    Replace,
    Append,
}

impl ImportMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "replace" => Some(ImportMode::Replace),
            "append" => Some(ImportMode::Append),
            _ => None,
        }
    }
}

/// One key in the local key/value store, backed by `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct StorageSlot {
    root: PathBuf,
    key: String,
}

impl StorageSlot {
    pub fn new(root: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            key: key.into(),
        }
    }

    pub fn participants(root: impl Into<PathBuf>) -> Self {
        Self::new(root, STORAGE_KEY)
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.key))
    }

    pub fn read(&self) -> Option<String> {
        fs::read_to_string(self.path()).ok()
    }

    pub fn write(&self, content: &str) -> StoreResult<()> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, content).map_err(|source| StoreError::Io { path, source })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    participants: Vec<Participant>,
}

impl RecordStore {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self { participants }
    }

    /// Loads the persisted collection; anything unreadable yields an empty store.
    pub fn load(slot: &StorageSlot) -> Self {
        let Some(raw) = slot.read() else {
            return Self::default();
        };
        let entries = match serde_json::from_str::<serde_json::Value>(raw.as_str()) {
            Ok(serde_json::Value::Array(entries)) => entries,
            Ok(_) => {
                tracing::warn!(
                    path = %slot.path().display(),
                    "stored participants are not a list; starting empty"
                );
                return Self::default();
            }
            Err(err) => {
                tracing::warn!(
                    path = %slot.path().display(),
                    error = %err,
                    "stored participants are corrupt; starting empty"
                );
                return Self::default();
            }
        };

        let mut seen = HashSet::new();
        let participants: Vec<Participant> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<Participant>(entry).ok())
            .map(Participant::normalized)
            .filter(|participant| participant.has_name() && !participant.id.is_empty())
            .filter(|participant| seen.insert(participant.id.clone()))
            .collect();
        tracing::info!(count = participants.len(), "loaded participants");
        Self::new(participants)
    }

    pub fn save(&self, slot: &StorageSlot) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(&self.participants)?;
        slot.write(content.as_str())?;
        tracing::debug!(count = self.participants.len(), "saved participants");
        Ok(())
    }

    pub fn records(&self) -> &[Participant] {
        self.participants.as_slice()
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|participant| participant.id == id)
    }

    pub fn add(&mut self, draft: ParticipantDraft) -> StoreResult<String> {
        if draft.name.trim().is_empty() {
            return Err(StoreError::BlankName);
        }
        let participant = Participant::from_draft(draft);
        let id = participant.id.clone();
        self.participants.insert(0, participant);
        Ok(id)
    }

    /// Returns whether a record changed. Unknown ids are a no-op.
    pub fn update_field(&mut self, id: &str, field: ParticipantField, value: FieldValue) -> bool {
        self.participants
            .iter_mut()
            .find(|participant| participant.id == id)
            .map(|participant| participant.apply(field, value))
            .unwrap_or(false)
    }

    pub fn remove(&mut self, ids: &HashSet<String>) -> usize {
        let before = self.participants.len();
        self.participants.retain(|participant| !ids.contains(&participant.id));
        before - self.participants.len()
    }

    pub fn import(&mut self, incoming: Vec<Participant>, mode: ImportMode) -> usize {
        let mut seen = HashSet::new();
        let incoming: Vec<Participant> = incoming
            .into_iter()
            .filter(|participant| participant.has_name())
            .filter(|participant| seen.insert(participant.id.clone()))
            .collect();
        let count = incoming.len();

        match mode {
            ImportMode::Replace => self.participants = incoming,
            ImportMode::Append => {
                let mut fresh = Vec::new();
                for participant in incoming {
                    match self
                        .participants
                        .iter_mut()
                        .find(|existing| existing.id == participant.id)
                    {
                        Some(existing) => *existing = participant,
                        None => fresh.push(participant),
                    }
                }
                fresh.append(&mut self.participants);
                self.participants = fresh;
            }
        }
        tracing::info!(count, ?mode, "imported participants");
        count
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
