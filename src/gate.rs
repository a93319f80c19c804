use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Cage ID# must be a valid number")]
    InvalidCageId,
    #[error("No data to submit")]
    NoData,
    #[error("no entry at position {index} (log holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Free-text fields captured when the submit modal opens. The log/config
/// snapshot itself is taken later, at confirm time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmitFields {
    pub comment: String,
    pub email: Option<String>,
    pub photo_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    SubmitAll(SubmitFields),
    DeleteAll,
    DeleteOne(usize),
}

/// Guards destructive and remote-affecting actions behind an explicit
/// confirm step. At most one request is armed; arming a new one replaces
/// the old (a single user cannot race themselves meaningfully).
#[derive(Debug, Default)]
pub struct ConfirmationGate {
    pending: Option<PendingAction>,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a submit-all request. Validation failures reject the request
    /// before anything is armed; the gate stays idle.
    pub fn request_submit(
        &mut self,
        cage_id: &str,
        log_len: usize,
        fields: SubmitFields,
    ) -> Result<(), GateError> {
        let cage_id = cage_id.trim();
        let parsed: f64 = cage_id.parse().map_err(|_| GateError::InvalidCageId)?;
        if !parsed.is_finite() || parsed <= 0.0 {
            return Err(GateError::InvalidCageId);
        }
        if log_len == 0 {
            return Err(GateError::NoData);
        }

        self.pending = Some(PendingAction::SubmitAll(fields));
        Ok(())
    }

    pub fn request_delete_all(&mut self) {
        self.pending = Some(PendingAction::DeleteAll);
    }

    pub fn request_delete_one(&mut self, index: usize, log_len: usize) -> Result<(), GateError> {
        if index >= log_len {
            return Err(GateError::IndexOutOfRange {
                index,
                len: log_len,
            });
        }
        self.pending = Some(PendingAction::DeleteOne(index));
        Ok(())
    }

    /// Resolves the armed request, returning it for the caller to execute.
    /// The gate is idle again afterwards.
    pub fn confirm(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    /// Discards the armed request with no side effect. Dismissing the modal
    /// routes here too.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
