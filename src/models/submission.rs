use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::SessionConfig;

/// One displayed log row. Position is 1-based because that is what the
/// field worker sees next to each entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRow {
    pub position: usize,
    pub value: f64,
    pub unit: &'static str,
}

/// Snapshot assembled when the user confirms a submission. Consumed by the
/// pipeline; the durable log is only cleared after the whole batch lands.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub values: Vec<f64>,
    pub config: SessionConfig,
    pub comment: String,
    pub email: Option<String>,
    pub photo_path: Option<PathBuf>,
}

/// One row of the remote append request, snake_case per the sheet relay's
/// wire contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SheetRow {
    pub cage_id: i64,
    pub month: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub value: f64,
    pub comment: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub rows_submitted: usize,
    pub photo_file_id: Option<String>,
    /// Only true when a receipt was requested and the send succeeded; the
    /// UI shows its "receipt sent" note off this flag alone.
    pub receipt_sent: bool,
}
