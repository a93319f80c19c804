use serde::{Deserialize, Serialize};

/// Reporting month for the current monitoring season.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    Aug,
    Sep,
}

impl Default for Month {
    fn default() -> Self {
        Month::Aug
    }
}

impl Month {
    pub fn as_str(&self) -> &'static str {
        match self {
            Month::Aug => "aug",
            Month::Sep => "sep",
        }
    }

    /// Full month name used in email receipts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Month::Aug => "August",
            Month::Sep => "September",
        }
    }
}

/// What kind of measurement the log currently records. Not stored per-entry:
/// the log as a whole is implicitly "for the selected type".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Size,
    Count,
    Wild,
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Size
    }
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Size => "size",
            DataType::Count => "count",
            DataType::Wild => "wild",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            DataType::Size => "mm",
            DataType::Count | DataType::Wild => "spat",
        }
    }

    /// Human-readable label used in email receipts.
    pub fn label(&self) -> &'static str {
        match self {
            DataType::Size => "Oyster Size",
            DataType::Count => "Shell Spat Count",
            DataType::Wild => "Wild Shell Spat Count",
        }
    }

    pub fn display_title(&self) -> &'static str {
        match self {
            DataType::Size => "Oyster Size Data:",
            DataType::Count => "Shell Spat Count Data:",
            DataType::Wild => "Wild Shell Spat Count Data:",
        }
    }

    pub fn input_title(&self) -> &'static str {
        match self {
            DataType::Size => "Enter Oyster Size:",
            DataType::Count => "Enter Shell Spat Count:",
            DataType::Wild => "Enter Wild Shell Spat Count:",
        }
    }
}

/// The persisted configuration triple tagging every measurement in the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub cage_id: String,
    pub month: Month,
    pub data_type: DataType,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cage_id: String::new(),
            month: Month::default(),
            data_type: DataType::default(),
        }
    }
}
