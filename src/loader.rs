use crate::columns;
use crate::config::SourceConfig;
use crate::error::{FleetError, Result};
use crate::types::{Cell, FleetDataset, FleetRecord, RawTable, COL_STATUS, TEXT_COLUMNS};
use crate::util::{canonical_text, header_label};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Data rows below the promoted header.
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_missing_status: usize,
    pub columns: Vec<String>,
    pub ambiguous_region_columns: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceFormat {
    Workbook,
    Csv,
}

fn source_format(file_name: &str) -> Result<SourceFormat> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Workbook),
        "csv" => Ok(SourceFormat::Csv),
        other => Err(FleetError::MalformedSpreadsheet(format!(
            "unsupported file type '{}' for {}",
            other, file_name
        ))),
    }
}

fn cell_from_data(d: &Data) -> Cell {
    match d {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Error(e.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn read_workbook(bytes: &[u8], sheet_name: &str) -> Result<Vec<Vec<Cell>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| FleetError::MalformedSpreadsheet(format!("unreadable workbook: {}", e)))?;

    if !workbook.sheet_names().iter().any(|n| n == sheet_name) {
        return Err(FleetError::MalformedSpreadsheet(format!(
            "sheet '{}' not found (available: {})",
            sheet_name,
            workbook.sheet_names().join(", ")
        )));
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| FleetError::MalformedSpreadsheet(e.to_string()))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect())
}

fn read_csv(bytes: &[u8]) -> Result<Vec<Vec<Cell>>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result
            .map_err(|e| FleetError::MalformedSpreadsheet(format!("unreadable CSV: {}", e)))?;
        rows.push(
            record
                .iter()
                .map(|f| if f.is_empty() { Cell::Empty } else { Cell::text(f) })
                .collect(),
        );
    }
    Ok(rows)
}

/// Read the configured sheet out of an uploaded file. The first
/// `header_offset` sheet rows are skipped; the row after them is the header.
pub fn read_sheet(bytes: &[u8], file_name: &str, source: &SourceConfig) -> Result<RawTable> {
    let mut rows = match source_format(file_name)? {
        SourceFormat::Workbook => read_workbook(bytes, &source.sheet_name)?,
        SourceFormat::Csv => read_csv(bytes)?,
    };
    let skip = source.header_offset.min(rows.len());
    rows.drain(..skip);
    debug!(file = file_name, rows = rows.len(), "sheet read");
    Ok(RawTable::new(rows))
}

/// Promote the header row, reconcile labels and canonicalize every record.
pub fn normalize(raw: &RawTable) -> Result<(FleetDataset, LoadReport)> {
    if raw.data_rows() == 0 {
        return Err(FleetError::EmptyDataset(
            "the sheet has no rows below the header".to_string(),
        ));
    }

    let header: Vec<String> = raw.rows[0].iter().map(header_label).collect();
    let reconciled = columns::reconcile(&header);
    if let Some(n) = reconciled.ambiguous_region_columns {
        warn!(
            count = n,
            "more than two UF columns; origin/destination were not assigned"
        );
    }
    let labels = reconciled.labels;

    if !labels.iter().any(|l| l == COL_STATUS) {
        return Err(FleetError::MalformedSpreadsheet(format!(
            "no {} column in header",
            COL_STATUS
        )));
    }

    let mut records = Vec::with_capacity(raw.data_rows());
    let mut dropped = 0usize;
    for row in &raw.rows[1..] {
        let mut rec = FleetRecord::with_status(String::new());
        for (idx, label) in labels.iter().enumerate() {
            let cell = row.get(idx).cloned().unwrap_or(Cell::Empty);
            if TEXT_COLUMNS.contains(&label.as_str()) {
                rec.set_text_field(label, canonical_text(&cell));
            } else {
                rec.extras.push((label.clone(), cell));
            }
        }
        if rec.status.is_empty() {
            dropped += 1;
            continue;
        }
        records.push(rec);
    }

    if dropped > 0 {
        warn!(dropped, "rows without STATUS were discarded");
    }
    if records.is_empty() {
        return Err(FleetError::EmptyDataset(
            "no rows with a valid STATUS after cleaning".to_string(),
        ));
    }

    let report = LoadReport {
        total_rows: raw.data_rows(),
        kept_rows: records.len(),
        dropped_missing_status: dropped,
        columns: labels.clone(),
        ambiguous_region_columns: reconciled.ambiguous_region_columns,
    };
    Ok((
        FleetDataset {
            columns: labels,
            records,
        },
        report,
    ))
}

/// Full ingestion pass for one uploaded file.
pub fn load_and_clean(
    bytes: &[u8],
    file_name: &str,
    source: &SourceConfig,
) -> Result<(FleetDataset, LoadReport)> {
    let raw = read_sheet(bytes, file_name, source)?;
    let (dataset, report) = normalize(&raw)?;
    info!(
        file = file_name,
        rows = report.total_rows,
        kept = report.kept_rows,
        "fleet sheet loaded"
    );
    Ok((dataset, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{COL_DESTINATION, COL_ORIGIN, COL_TYPE};

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells
            .iter()
            .map(|c| if c.is_empty() { Cell::Empty } else { Cell::text(*c) })
            .collect()
    }

    #[test]
    fn maintenance_scenario() {
        let raw = RawTable::new(vec![row(&["STATUS", "TIPO"]), row(&[" manutenção ", "cam"])]);
        let (ds, rep) = normalize(&raw).unwrap();
        assert_eq!(ds.records.len(), 1);
        assert_eq!(ds.records[0].status, "MANUTENÇÃO");
        assert_eq!(ds.records[0].vehicle_type.as_deref(), Some("CAM"));
        assert_eq!(rep.kept_rows, 1);
        assert_eq!(rep.dropped_missing_status, 0);
    }

    #[test]
    fn rows_without_status_are_dropped() {
        let raw = RawTable::new(vec![
            row(&["PLACA", "STATUS"]),
            row(&["abc1234", "carregado"]),
            row(&["xyz9876", "  "]),
            row(&["qwe1111", "nan"]),
            row(&["rty2222"]),
        ]);
        let (ds, rep) = normalize(&raw).unwrap();
        assert_eq!(ds.records.len(), 1);
        assert_eq!(ds.records[0].plate.as_deref(), Some("ABC1234"));
        assert_eq!(rep.dropped_missing_status, 3);
        assert_eq!(rep.total_rows, 4);
    }

    #[test]
    fn all_rows_without_status_is_empty_dataset() {
        let raw = RawTable::new(vec![row(&["STATUS", "TIPO"]), row(&["", "CAM"]), row(&["NaN", "BI"])]);
        assert!(matches!(normalize(&raw), Err(FleetError::EmptyDataset(_))));
    }

    #[test]
    fn header_only_is_empty_dataset() {
        let raw = RawTable::new(vec![row(&["STATUS"])]);
        assert!(matches!(normalize(&raw), Err(FleetError::EmptyDataset(_))));
        assert!(matches!(
            normalize(&RawTable::default()),
            Err(FleetError::EmptyDataset(_))
        ));
    }

    #[test]
    fn missing_status_column_is_malformed() {
        let raw = RawTable::new(vec![row(&["PLACA"]), row(&["ABC"])]);
        assert!(matches!(
            normalize(&raw),
            Err(FleetError::MalformedSpreadsheet(_))
        ));
    }

    #[test]
    fn duplicate_uf_columns_map_to_regions() {
        let raw = RawTable::new(vec![
            row(&["STATUS", "UF", "TIPO", "UF"]),
            row(&["carregado", " sp", "cam", "mg "]),
        ]);
        let (ds, _) = normalize(&raw).unwrap();
        assert!(ds.has_origin_region());
        assert!(ds.has_column(COL_DESTINATION));
        let r = &ds.records[0];
        assert_eq!(r.origin_region.as_deref(), Some("SP"));
        assert_eq!(r.destination_region.as_deref(), Some("MG"));
        assert_eq!(ds.columns[1], COL_ORIGIN);
        assert_eq!(ds.columns[2], COL_TYPE);
    }

    #[test]
    fn extra_columns_pass_through_untouched() {
        let raw = RawTable::new(vec![
            vec![Cell::text("STATUS"), Cell::text("KM"), Cell::text("Obs")],
            vec![Cell::text("carregado"), Cell::Number(1520.0), Cell::text("  pneu ")],
        ]);
        let (ds, _) = normalize(&raw).unwrap();
        let r = &ds.records[0];
        assert_eq!(r.extra("KM"), Some(&Cell::Number(1520.0)));
        assert_eq!(r.extra("Obs"), Some(&Cell::text("  pneu ")));
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = RawTable::new(vec![
            row(&["PLACA", "STATUS", "UF", "UF", "OBS", "OBS"]),
            row(&["abc", " carregado", "sp", "rj", "x", ""]),
            row(&["def", "manutenção", "", "mg", "", "y"]),
        ]);
        let (first, _) = normalize(&raw).unwrap();
        let (second, _) = normalize(&first.to_raw_table()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn csv_source_skips_leading_rows() {
        let data = "FROTA AGRO,,\nPLACA,STATUS,TIPO\nabc,carregado,cam\n";
        let raw = read_sheet(data.as_bytes(), "frota.csv", &SourceConfig::default()).unwrap();
        assert_eq!(raw.rows.len(), 2);
        let (ds, _) = normalize(&raw).unwrap();
        assert_eq!(ds.records[0].status, "CARREGADO");
    }

    #[test]
    fn unknown_extension_is_malformed() {
        let err = read_sheet(b"whatever", "frota.txt", &SourceConfig::default()).unwrap_err();
        assert!(matches!(err, FleetError::MalformedSpreadsheet(_)));
    }

    #[test]
    fn garbage_workbook_is_malformed() {
        let err = read_sheet(b"not a zip", "frota.xlsx", &SourceConfig::default()).unwrap_err();
        assert!(matches!(err, FleetError::MalformedSpreadsheet(_)));
    }
}
