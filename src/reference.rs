use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Arc, RwLock};

/// The visualization endpoint wraps its JSON in a JS callback: a fixed
/// 47-byte prefix (`/*O_o*/\ngoogle.visualization.Query.setResponse(`) and a
/// 2-byte `);` suffix.
const WRAPPER_PREFIX_LEN: usize = 47;
const WRAPPER_SUFFIX_LEN: usize = 2;

#[derive(Deserialize)]
struct WrappedPayload {
    table: PayloadTable,
}

#[derive(Deserialize)]
struct PayloadTable {
    #[serde(default)]
    rows: Vec<PayloadRow>,
}

#[derive(Deserialize)]
struct PayloadRow {
    #[serde(default)]
    c: Vec<Option<PayloadCell>>,
}

#[derive(Deserialize)]
struct PayloadCell {
    #[serde(default)]
    v: Option<Value>,
    #[serde(default)]
    f: Option<Value>,
}

/// Read-only reference rows fetched once at startup. Loading happens in a
/// background task; everything else works fine if it never completes.
#[derive(Clone, Default)]
pub struct ReferenceCache {
    rows: Arc<RwLock<Vec<Vec<String>>>>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.read().unwrap().clone()
    }

    pub async fn refresh(&self, client: &reqwest::Client, url: &str) -> Result<usize> {
        let text = client
            .get(url)
            .send()
            .await
            .context("reference data request failed")?
            .error_for_status()
            .context("reference data request rejected")?
            .text()
            .await
            .context("reference data body unreadable")?;

        let rows = parse_wrapped(&text)?;
        let count = rows.len();
        *self.rows.write().unwrap() = rows;
        Ok(count)
    }
}

/// Strips the callback wrapper and flattens the cell grid into display
/// strings, preferring a cell's literal value over its formatted one and
/// defaulting absent cells to "".
pub fn parse_wrapped(text: &str) -> Result<Vec<Vec<String>>> {
    let end = text
        .len()
        .checked_sub(WRAPPER_SUFFIX_LEN)
        .filter(|&end| end >= WRAPPER_PREFIX_LEN)
        .ok_or_else(|| anyhow!("reference payload too short ({} bytes)", text.len()))?;
    let inner = text
        .get(WRAPPER_PREFIX_LEN..end)
        .ok_or_else(|| anyhow!("reference payload not sliceable at fixed offsets"))?;

    let payload: WrappedPayload =
        serde_json::from_str(inner).context("reference payload is not valid JSON")?;

    Ok(payload
        .table
        .rows
        .into_iter()
        .map(|row| row.c.into_iter().map(cell_display).collect())
        .collect())
}

fn cell_display(cell: Option<PayloadCell>) -> String {
    let Some(cell) = cell else {
        return String::new();
    };
    value_display(cell.v)
        .or_else(|| value_display(cell.f))
        .unwrap_or_default()
}

fn value_display(value: Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    }
}
