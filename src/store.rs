use anyhow::{Context, Result};
use log::warn;
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::models::{DataType, Month, SessionConfig};

/// Named slots under the app data dir. Each holds one JSON document and is
/// rewritten whole on every mutation.
const LOG_SLOT: &str = "measurements.json";
const CONFIG_SLOT: &str = "config.json";

struct SessionData {
    log: Vec<f64>,
    config: SessionConfig,
}

/// Durable owner of the measurement log and the session configuration.
/// Every mutating call persists before returning, so the UI can reflect
/// state immediately after a command resolves.
pub struct SessionStore {
    dir: PathBuf,
    data: RwLock<SessionData>,
}

impl SessionStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;

        let log = load_slot(&dir.join(LOG_SLOT));
        let config = load_slot(&dir.join(CONFIG_SLOT));

        Ok(Self {
            dir,
            data: RwLock::new(SessionData { log, config }),
        })
    }

    pub fn log(&self) -> Vec<f64> {
        self.data.read().unwrap().log.clone()
    }

    pub fn log_len(&self) -> usize {
        self.data.read().unwrap().log.len()
    }

    pub fn config(&self) -> SessionConfig {
        self.data.read().unwrap().config.clone()
    }

    pub fn replace_log(&self, log: Vec<f64>) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.log = log;
        self.persist_slot(LOG_SLOT, &guard.log)
    }

    pub fn clear_log(&self) -> Result<()> {
        self.replace_log(Vec::new())
    }

    pub fn set_cage_id(&self, cage_id: String) -> Result<SessionConfig> {
        self.update_config(|config| config.cage_id = cage_id)
    }

    pub fn set_month(&self, month: Month) -> Result<SessionConfig> {
        self.update_config(|config| config.month = month)
    }

    pub fn set_data_type(&self, data_type: DataType) -> Result<SessionConfig> {
        {
            let guard = self.data.read().unwrap();
            if !guard.log.is_empty() && guard.config.data_type != data_type {
                // Existing entries are not retagged; they will submit under
                // the new type. Behavior inherited from the field workflow,
                // pending a stakeholder decision.
                warn!(
                    "data type changed from {} to {} with {} entries in the log",
                    guard.config.data_type.as_str(),
                    data_type.as_str(),
                    guard.log.len()
                );
            }
        }
        self.update_config(|config| config.data_type = data_type)
    }

    fn update_config(&self, mutate: impl FnOnce(&mut SessionConfig)) -> Result<SessionConfig> {
        let mut guard = self.data.write().unwrap();
        mutate(&mut guard.config);
        self.persist_slot(CONFIG_SLOT, &guard.config)?;
        Ok(guard.config.clone())
    }

    /// Write-to-temp-then-rename so a slot is never observed half-written.
    fn persist_slot<T: Serialize>(&self, slot: &str, value: &T) -> Result<()> {
        let path = self.dir.join(slot);
        let tmp = self.dir.join(format!("{slot}.tmp"));
        let serialized = serde_json::to_string_pretty(value)?;
        fs::write(&tmp, serialized)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }
}

fn load_slot<T: DeserializeOwned + Default>(path: &PathBuf) -> T {
    if !path.exists() {
        return T::default();
    }
    match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            warn!("discarding corrupt slot {}: {err}", path.display());
            T::default()
        }),
        Err(err) => {
            warn!("failed to read slot {}: {err}", path.display());
            T::default()
        }
    }
}
