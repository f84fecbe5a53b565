#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod config;
mod controller;
mod csv_codec;
mod error;
mod participant;
mod state;
mod store;
mod view;

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tauri::{AppHandle, Manager, State};
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, Settings};
use crate::controller::Roster;
use crate::csv_codec::{csv_data_uri, export_filename, from_csv, to_csv, DEFAULT_EXPORT_NAME};
use crate::error::StoreError;
use crate::participant::{FieldValue, Participant, ParticipantDraft, ParticipantField};
use crate::state::{Action, RosterView};
use crate::store::{ImportMode, StorageSlot};
use crate::view::FilterMode;

type RosterState<'a> = State<'a, Mutex<Roster>>;

#[derive(Serialize)]
struct PickTextFileResult {
    ok: bool,
    canceled: bool,
    name: Option<String>,
    data: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ExportRequest {
    filename: String,
}

#[derive(Serialize)]
struct SaveCsvResult {
    ok: bool,
    canceled: bool,
    filename: String,
    path: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct ExportDataUriResult {
    filename: String,
    uri: String,
}

#[derive(Serialize)]
struct StorageInfoResult {
    ok: bool,
    path_label: String,
}

#[derive(Deserialize)]
struct RosterQueryRequest {
    search: Option<String>,
    filter: Option<String>,
}

#[derive(Deserialize)]
struct ParticipantUpdateRequest {
    id: String,
    field: ParticipantField,
    value: FieldValue,
}

#[derive(Deserialize)]
struct ParticipantRemoveRequest {
    ids: Vec<String>,
}

#[derive(Deserialize)]
struct CsvImportApplyRequest {
    action: String,
    file_data: String,
}

fn lock_roster<'a>(state: &'a RosterState<'_>) -> Result<MutexGuard<'a, Roster>, String> {
    state.lock().map_err(|err| err.to_string())
}

#[tauri::command]
fn app_version(app: AppHandle) -> String {
    app.package_info().version.to_string()
}

#[tauri::command]
fn storage_info(state: RosterState<'_>) -> Result<StorageInfoResult, String> {
    let roster = lock_roster(&state)?;
    Ok(StorageInfoResult {
        ok: true,
        path_label: roster.slot().root().to_string_lossy().to_string(),
    })
}

#[tauri::command]
fn roster_get(state: RosterState<'_>) -> Result<RosterView, String> {
    Ok(lock_roster(&state)?.view())
}

#[tauri::command]
fn roster_set_query(
    state: RosterState<'_>,
    payload: RosterQueryRequest,
) -> Result<RosterView, String> {
    let mut roster = lock_roster(&state)?;
    if let Some(search) = payload.search {
        roster
            .dispatch(Action::SetSearch(clean_text(search.as_str(), 200, false)))
            .map_err(|err| err.to_string())?;
    }
    if let Some(filter) = payload.filter {
        roster
            .dispatch(Action::SetFilter(FilterMode::parse(filter.as_str())))
            .map_err(|err| err.to_string())?;
    }
    Ok(roster.view())
}

#[tauri::command]
fn participant_add(
    state: RosterState<'_>,
    payload: ParticipantDraft,
) -> Result<serde_json::Value, String> {
    let mut roster = lock_roster(&state)?;
    match roster.add(payload) {
        Ok(id) => Ok(json!({ "ok": true, "id": id })),
        Err(err @ StoreError::BlankName) => Ok(json!({
            "ok": false,
            "code": "validation",
            "error": err.to_string(),
        })),
        Err(err) => Err(err.to_string()),
    }
}

#[tauri::command]
fn participant_update(
    state: RosterState<'_>,
    payload: ParticipantUpdateRequest,
) -> Result<Option<Participant>, String> {
    let mut roster = lock_roster(&state)?;
    let id = clean_text(payload.id.as_str(), 128, true);
    roster
        .dispatch(Action::UpdateField {
            id: id.clone(),
            field: payload.field,
            value: payload.value,
        })
        .map_err(|err| err.to_string())?;
    Ok(roster.state().participants.get(id.as_str()).cloned())
}

#[tauri::command]
fn participant_remove(
    state: RosterState<'_>,
    payload: ParticipantRemoveRequest,
) -> Result<serde_json::Value, String> {
    let ids: HashSet<String> = payload
        .ids
        .iter()
        .map(|id| clean_text(id.as_str(), 128, true))
        .filter(|id| !id.is_empty())
        .collect();
    let mut roster = lock_roster(&state)?;
    let before = roster.state().participants.records().len();
    roster
        .dispatch(Action::Remove(ids))
        .map_err(|err| err.to_string())?;
    let removed = before - roster.state().participants.records().len();
    Ok(json!({ "ok": true, "removed": removed }))
}

fn export_csv(state: &RosterState<'_>) -> Result<String, String> {
    let roster = lock_roster(state)?;
    Ok(to_csv(roster.state().participants.records()))
}

#[tauri::command]
fn csv_export_data_uri(
    state: RosterState<'_>,
    payload: ExportRequest,
) -> Result<ExportDataUriResult, String> {
    let csv = export_csv(&state)?;
    Ok(ExportDataUriResult {
        filename: export_filename(clean_text(payload.filename.as_str(), 255, true).as_str()),
        uri: csv_data_uri(csv.as_str()),
    })
}

#[tauri::command]
fn csv_save_file(state: RosterState<'_>, payload: ExportRequest) -> Result<SaveCsvResult, String> {
    let filename = export_filename(clean_text(payload.filename.as_str(), 255, true).as_str());
    let content = export_csv(&state)?;
    let Some(path) = rfd::FileDialog::new()
        .add_filter("CSV", &["csv"])
        .set_file_name(filename.as_str())
        .save_file()
    else {
        return Ok(SaveCsvResult {
            ok: false,
            canceled: true,
            filename,
            path: None,
            error: None,
        });
    };

    write_text_file(&path, content.as_str())?;
    tracing::info!(path = %path.display(), "exported participants");
    Ok(SaveCsvResult {
        ok: true,
        canceled: false,
        filename,
        path: Some(path.display().to_string()),
        error: None,
    })
}

#[tauri::command]
fn csv_pick_file() -> Result<PickTextFileResult, String> {
    let picked = rfd::FileDialog::new()
        .add_filter("CSV", &["csv"])
        .add_filter("Text", &["txt"])
        .pick_file();

    let result = match picked {
        Some(path) => PickTextFileResult {
            ok: true,
            canceled: false,
            data: Some(fs::read_to_string(&path).map_err(|err| err.to_string())?),
            name: Some(
                path.file_name()
                    .map_or(DEFAULT_EXPORT_NAME.into(), |name| name.to_string_lossy().into_owned()),
            ),
            error: None,
        },
        None => PickTextFileResult {
            ok: false,
            canceled: true,
            name: None,
            data: None,
            error: None,
        },
    };
    Ok(result)
}

#[tauri::command]
fn csv_import_apply(
    state: RosterState<'_>,
    payload: CsvImportApplyRequest,
) -> Result<serde_json::Value, String> {
    let action = clean_text(payload.action.as_str(), 20, true);
    let Some(mode) = ImportMode::parse(action.as_str()) else {
        return Ok(json!({
            "ok": false,
            "code": "broken",
            "error": "Invalid import action.",
        }));
    };

    let records = from_csv(payload.file_data.as_str());
    let imported = records.len();
    let mut roster = lock_roster(&state)?;
    roster
        .dispatch(Action::Import { records, mode })
        .map_err(|err| err.to_string())?;

    Ok(json!({
        "ok": true,
        "action": action.to_lowercase(),
        "imported": imported,
        "total": roster.state().participants.records().len(),
    }))
}

/// Drops ASCII control characters and caps the length in chars.
fn clean_text(value: &str, max_len: usize, trim: bool) -> String {
    let value = if trim { value.trim() } else { value };
    value
        .chars()
        .filter(|ch| !ch.is_ascii_control())
        .take(max_len)
        .collect()
}

fn write_text_file(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| err.to_string())?;
    }
    fs::write(path, content).map_err(|err| err.to_string())
}

fn storage_root_dir(app: &AppHandle, settings: &Settings) -> Result<PathBuf, String> {
    let root = match settings.data_dir.as_ref() {
        Some(dir) => dir.clone(),
        None => app
            .path()
            .app_data_dir()
            .map_err(|err| err.to_string())?
            .join("StipendRoster"),
    };
    fs::create_dir_all(root.as_path()).map_err(|err| err.to_string())?;
    Ok(root)
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_new(settings.log_filter.as_str())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let settings = load_settings();
    init_tracing(&settings);

    tauri::Builder::default()
        .setup(move |app| {
            let root = storage_root_dir(app.handle(), &settings)?;
            tracing::info!(root = %root.display(), "opening participant storage");
            app.manage(Mutex::new(Roster::open(StorageSlot::participants(root))));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            app_version,
            storage_info,
            roster_get,
            roster_set_query,
            participant_add,
            participant_update,
            participant_remove,
            csv_export_data_uri,
            csv_save_file,
            csv_pick_file,
            csv_import_apply
        ])
        .run(tauri::generate_context!())
        .expect("failed to run Stipend Roster");
}
