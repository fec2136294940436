use serde::Serialize;
use std::fmt;
use tabled::Tabled;

pub const COL_STATUS: &str = "STATUS";
pub const COL_TYPE: &str = "TIPO";
pub const COL_POSITION: &str = "POSIÇÃO ATUAL";
pub const COL_PLATE: &str = "PLACA";
pub const COL_DRIVER: &str = "MOTORISTA";
pub const COL_OPERATION: &str = "OPERAÇÃO";
pub const COL_ORIGIN: &str = "UF_ORIGEM";
pub const COL_DESTINATION: &str = "UF_DESTINO";
pub const COL_FINAL_DESTINATION: &str = "DESTINO FINAL";

/// Columns that are canonicalized (trimmed, upper-cased, blanks to missing).
pub const TEXT_COLUMNS: [&str; 9] = [
    COL_STATUS,
    COL_TYPE,
    COL_POSITION,
    COL_PLATE,
    COL_DRIVER,
    COL_OPERATION,
    COL_ORIGIN,
    COL_DESTINATION,
    COL_FINAL_DESTINATION,
];

/// One raw spreadsheet cell, as handed over by the sheet reader.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Error(String),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) | Cell::Error(s) => f.write_str(s),
            // f64's Display already drops the ".0" of integral values.
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Rows of the sheet's data area. Row 0 is the header row, promoted on load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Number of rows below the header row.
    pub fn data_rows(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}

/// A normalized vehicle row. Textual fields are upper-cased and trimmed;
/// `None` is the missing marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetRecord {
    pub plate: Option<String>,
    pub status: String,
    pub vehicle_type: Option<String>,
    pub current_position: Option<String>,
    pub driver: Option<String>,
    pub operation: Option<String>,
    pub origin_region: Option<String>,
    pub destination_region: Option<String>,
    pub final_destination: Option<String>,
    /// Columns outside the textual set, untouched and in column order.
    pub extras: Vec<(String, Cell)>,
}

impl FleetRecord {
    /// Record with only a status set; handy as a starting point.
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            plate: None,
            status: status.into(),
            vehicle_type: None,
            current_position: None,
            driver: None,
            operation: None,
            origin_region: None,
            destination_region: None,
            final_destination: None,
            extras: Vec::new(),
        }
    }

    /// Value of a textual column by its label. Returns `None` both for a
    /// missing value and for a label outside the textual set.
    pub fn text_field(&self, label: &str) -> Option<&str> {
        match label {
            COL_STATUS => Some(self.status.as_str()),
            COL_TYPE => self.vehicle_type.as_deref(),
            COL_POSITION => self.current_position.as_deref(),
            COL_PLATE => self.plate.as_deref(),
            COL_DRIVER => self.driver.as_deref(),
            COL_OPERATION => self.operation.as_deref(),
            COL_ORIGIN => self.origin_region.as_deref(),
            COL_DESTINATION => self.destination_region.as_deref(),
            COL_FINAL_DESTINATION => self.final_destination.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn set_text_field(&mut self, label: &str, value: Option<String>) {
        match label {
            COL_STATUS => self.status = value.unwrap_or_default(),
            COL_TYPE => self.vehicle_type = value,
            COL_POSITION => self.current_position = value,
            COL_PLATE => self.plate = value,
            COL_DRIVER => self.driver = value,
            COL_OPERATION => self.operation = value,
            COL_ORIGIN => self.origin_region = value,
            COL_DESTINATION => self.destination_region = value,
            COL_FINAL_DESTINATION => self.final_destination = value,
            _ => {}
        }
    }

    pub fn extra(&self, label: &str) -> Option<&Cell> {
        self.extras.iter().find(|(l, _)| l == label).map(|(_, c)| c)
    }

    /// Cell for `label` as it would appear in a raw sheet.
    pub fn cell(&self, label: &str) -> Cell {
        if TEXT_COLUMNS.contains(&label) {
            return match self.text_field(label) {
                Some(v) => Cell::text(v),
                None => Cell::Empty,
            };
        }
        self.extra(label).cloned().unwrap_or(Cell::Empty)
    }
}

/// The cleaned dataset produced by one ingestion pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetDataset {
    /// Reconciled, unique column labels in sheet order.
    pub columns: Vec<String>,
    pub records: Vec<FleetRecord>,
}

impl FleetDataset {
    pub fn has_column(&self, label: &str) -> bool {
        self.columns.iter().any(|c| c == label)
    }

    pub fn has_origin_region(&self) -> bool {
        self.has_column(COL_ORIGIN)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rebuild a raw table (header row first) from the normalized records.
    pub fn to_raw_table(&self) -> RawTable {
        let mut rows = Vec::with_capacity(self.records.len() + 1);
        rows.push(self.columns.iter().map(Cell::text).collect());
        for r in &self.records {
            rows.push(self.columns.iter().map(|c| r.cell(c)).collect());
        }
        RawTable::new(rows)
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CountRow {
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct KpiCounts {
    pub total: usize,
    pub in_operation: usize,
    pub available: usize,
    pub maintenance: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiRow {
    #[tabled(rename = "KPI")]
    pub kpi: String,
    #[tabled(rename = "Vehicles")]
    pub count: usize,
}

/// Everything the presentation layer needs for one filter selection.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DashboardSummary {
    pub status_table: Vec<CountRow>,
    pub type_table: Vec<CountRow>,
    pub position_table: Vec<CountRow>,
    pub origin_table: Option<Vec<CountRow>>,
    pub kpis: KpiCounts,
    pub availability_rate: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct VehicleRow {
    #[serde(rename = "PLACA")]
    #[tabled(rename = "PLACA")]
    pub plate: String,
    #[serde(rename = "STATUS")]
    #[tabled(rename = "STATUS")]
    pub status: String,
    #[serde(rename = "TIPO")]
    #[tabled(rename = "TIPO")]
    pub vehicle_type: String,
    #[serde(rename = "POSIÇÃO ATUAL")]
    #[tabled(rename = "POSIÇÃO ATUAL")]
    pub current_position: String,
    #[serde(rename = "UF_ORIGEM")]
    #[tabled(rename = "UF_ORIGEM")]
    pub origin_region: String,
    #[serde(rename = "DESTINO FINAL")]
    #[tabled(rename = "DESTINO FINAL")]
    pub final_destination: String,
    #[serde(rename = "UF_DESTINO")]
    #[tabled(rename = "UF_DESTINO")]
    pub destination_region: String,
    #[serde(rename = "MOTORISTA")]
    #[tabled(rename = "MOTORISTA")]
    pub driver: String,
    #[serde(rename = "TAG")]
    #[tabled(rename = "TAG")]
    pub style: String,
}
