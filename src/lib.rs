mod config;
mod gate;
mod measurements;
mod models;
mod reference;
mod store;
mod submit;

use std::sync::{Arc, Mutex};

use log::{info, warn};
use tauri::{Manager, State};

use config::AppConfig;
use gate::ConfirmationGate;
use measurements::commands::{
    append_measurement, get_session_snapshot, set_cage_id, set_data_type, set_month,
};
use measurements::MeasurementLog;
use reference::ReferenceCache;
use store::SessionStore;
use submit::commands::{
    cancel_pending, confirm_pending, request_delete_all, request_delete_one, request_submit,
    submission_in_flight,
};
use submit::SubmissionController;

pub(crate) struct AppState {
    pub(crate) store: Arc<SessionStore>,
    pub(crate) log: MeasurementLog,
    pub(crate) gate: Mutex<ConfirmationGate>,
    pub(crate) submitter: SubmissionController,
    pub(crate) reference: ReferenceCache,
}

#[tauri::command]
fn get_reference_rows(state: State<'_, AppState>) -> Vec<Vec<String>> {
    state.reference.rows()
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Oysterlog starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let app_config = AppConfig::load(&app_data_dir.join("oysterlog.json"));
                let store = Arc::new(SessionStore::new(app_data_dir.join("session"))?);
                let http = reqwest::Client::new();

                let submitter =
                    SubmissionController::new(store.clone(), http.clone(), &app_config);
                let reference = ReferenceCache::new();

                // Reference data is display-only. Fetch it in the background
                // and carry on if the fetch never succeeds.
                {
                    let reference = reference.clone();
                    let url = app_config.reference_url();
                    tauri::async_runtime::spawn(async move {
                        match reference.refresh(&http, &url).await {
                            Ok(count) => info!("loaded {count} reference rows"),
                            Err(err) => warn!("reference data unavailable: {err:#}"),
                        }
                    });
                }

                app.manage(AppState {
                    log: MeasurementLog::new(store.clone()),
                    store,
                    gate: Mutex::new(ConfirmationGate::new()),
                    submitter,
                    reference,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            get_session_snapshot,
            append_measurement,
            set_cage_id,
            set_month,
            set_data_type,
            request_submit,
            request_delete_all,
            request_delete_one,
            confirm_pending,
            cancel_pending,
            submission_in_flight,
            get_reference_rows,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
