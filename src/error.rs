use thiserror::Error;

/// Failures surfaced by ingestion and by the session's export/config edges.
///
/// Only `MalformedSpreadsheet` and `EmptyDataset` come out of the pipeline
/// itself; both end the current upload and leave the session running.
#[derive(Error, Debug)]
pub enum FleetError {
    #[error("malformed spreadsheet: {0}")]
    MalformedSpreadsheet(String),

    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

impl FleetError {
    /// True for the two ingestion failures that reject an upload.
    pub fn is_ingestion(&self) -> bool {
        matches!(
            self,
            FleetError::MalformedSpreadsheet(_) | FleetError::EmptyDataset(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FleetError>;
