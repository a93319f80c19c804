use tauri::State;

use crate::{
    models::{DataType, Month, SessionConfig},
    AppState,
};

use super::SessionSnapshot;

#[tauri::command]
pub fn get_session_snapshot(state: State<'_, AppState>) -> SessionSnapshot {
    state.log.snapshot()
}

#[tauri::command]
pub fn append_measurement(
    state: State<'_, AppState>,
    value: String,
) -> Result<SessionSnapshot, String> {
    state.log.append(&value).map_err(|e| e.to_string())?;
    Ok(state.log.snapshot())
}

#[tauri::command]
pub fn set_cage_id(state: State<'_, AppState>, cage_id: String) -> Result<SessionConfig, String> {
    state.store.set_cage_id(cage_id).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn set_month(state: State<'_, AppState>, month: Month) -> Result<SessionConfig, String> {
    state.store.set_month(month).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn set_data_type(
    state: State<'_, AppState>,
    data_type: DataType,
) -> Result<SessionSnapshot, String> {
    state
        .store
        .set_data_type(data_type)
        .map_err(|e| e.to_string())?;
    Ok(state.log.snapshot())
}
