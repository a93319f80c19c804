pub mod commands;

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{MeasurementRow, SessionConfig};
use crate::store::SessionStore;

/// Hard cap on entries per batch; the field protocol samples at most 30
/// oysters per cage.
pub const MAX_ENTRIES: usize = 30;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Value must be a valid number")]
    InvalidValue,
    #[error("You cannot enter more than {MAX_ENTRIES} data points.")]
    CapacityExceeded,
    #[error("no entry at position {index} (log holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Persist(#[from] anyhow::Error),
}

/// Everything the measurement screen needs to redraw itself.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub rows: Vec<MeasurementRow>,
    pub config: SessionConfig,
    pub display_title: &'static str,
    pub input_title: &'static str,
}

/// Ordered, bounded log of numeric entries. All reads and writes go through
/// the session store so every mutation is durable before the UI sees it.
#[derive(Clone)]
pub struct MeasurementLog {
    store: Arc<SessionStore>,
}

impl MeasurementLog {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Validates and appends one raw text-field value. The input arrives as
    /// the user typed it; parsing happens here so the persisted log is
    /// always numeric.
    pub fn append(&self, raw: &str) -> Result<Vec<f64>, LogError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LogError::InvalidValue);
        }
        let value: f64 = trimmed.parse().map_err(|_| LogError::InvalidValue)?;
        if !value.is_finite() || value < 0.0 {
            return Err(LogError::InvalidValue);
        }

        let mut log = self.store.log();
        if log.len() >= MAX_ENTRIES {
            return Err(LogError::CapacityExceeded);
        }
        log.push(value);
        self.store.replace_log(log.clone())?;
        Ok(log)
    }

    /// Removes the entry at `index`. Confirmation must already have been
    /// resolved by the caller; no guarding happens here.
    pub fn remove_at(&self, index: usize) -> Result<Vec<f64>, LogError> {
        let mut log = self.store.log();
        if index >= log.len() {
            return Err(LogError::IndexOutOfRange {
                index,
                len: log.len(),
            });
        }
        log.remove(index);
        self.store.replace_log(log.clone())?;
        Ok(log)
    }

    pub fn clear(&self) -> Result<(), LogError> {
        self.store.clear_log()?;
        Ok(())
    }

    pub fn values(&self) -> Vec<f64> {
        self.store.log()
    }

    pub fn len(&self) -> usize {
        self.store.log_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Derives display rows from the current log and data type. The unit is
    /// computed, never stored, so a type switch relabels existing entries.
    pub fn render(&self) -> Vec<MeasurementRow> {
        let unit = self.store.config().data_type.unit();
        self.store
            .log()
            .into_iter()
            .enumerate()
            .map(|(i, value)| MeasurementRow {
                position: i + 1,
                value,
                unit,
            })
            .collect()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let config = self.store.config();
        SessionSnapshot {
            rows: self.render(),
            display_title: config.data_type.display_title(),
            input_title: config.data_type.input_title(),
            config,
        }
    }
}
