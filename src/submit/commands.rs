use serde::Serialize;
use std::path::PathBuf;
use tauri::State;

use crate::{
    gate::{PendingAction, SubmitFields},
    measurements::SessionSnapshot,
    models::{PendingSubmission, SubmissionOutcome},
    AppState,
};

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConfirmOutcome {
    Submitted {
        outcome: SubmissionOutcome,
        snapshot: SessionSnapshot,
    },
    Deleted {
        snapshot: SessionSnapshot,
    },
    /// Nothing was pending; confirm raced a cancel/dismiss.
    Idle,
}

#[tauri::command]
pub fn request_submit(
    state: State<'_, AppState>,
    comment: String,
    email: Option<String>,
    photo_path: Option<PathBuf>,
) -> Result<(), String> {
    let cage_id = state.store.config().cage_id;
    let fields = SubmitFields {
        comment,
        email,
        photo_path,
    };
    state
        .gate
        .lock()
        .unwrap()
        .request_submit(&cage_id, state.log.len(), fields)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn request_delete_all(state: State<'_, AppState>) {
    state.gate.lock().unwrap().request_delete_all();
}

#[tauri::command]
pub fn request_delete_one(state: State<'_, AppState>, index: usize) -> Result<(), String> {
    state
        .gate
        .lock()
        .unwrap()
        .request_delete_one(index, state.log.len())
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn cancel_pending(state: State<'_, AppState>) {
    state.gate.lock().unwrap().cancel();
}

/// Resolves the armed confirmation and executes its action. For submit-all
/// this suspends until the pipeline settles; the UI shows its processing
/// indicator until then.
#[tauri::command]
pub async fn confirm_pending(state: State<'_, AppState>) -> Result<ConfirmOutcome, String> {
    let action = { state.gate.lock().unwrap().confirm() };

    match action {
        None => Ok(ConfirmOutcome::Idle),
        Some(PendingAction::DeleteAll) => {
            state.log.clear().map_err(|e| e.to_string())?;
            Ok(ConfirmOutcome::Deleted {
                snapshot: state.log.snapshot(),
            })
        }
        Some(PendingAction::DeleteOne(index)) => {
            state.log.remove_at(index).map_err(|e| e.to_string())?;
            Ok(ConfirmOutcome::Deleted {
                snapshot: state.log.snapshot(),
            })
        }
        Some(PendingAction::SubmitAll(fields)) => {
            let pending = PendingSubmission {
                values: state.store.log(),
                config: state.store.config(),
                comment: fields.comment,
                email: fields.email,
                photo_path: fields.photo_path,
            };
            let outcome = state
                .submitter
                .submit(pending)
                .await
                .map_err(|e| e.to_string())?;
            Ok(ConfirmOutcome::Submitted {
                outcome,
                snapshot: state.log.snapshot(),
            })
        }
    }
}

#[tauri::command]
pub fn submission_in_flight(state: State<'_, AppState>) -> bool {
    state.submitter.is_in_flight()
}
