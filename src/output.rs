// Terminal rendering and file exports.
//
// Everything here reads what the session hands over and prints or writes
// it; nothing is fed back into the pipeline.
use crate::config::DisplayConfig;
use crate::error::Result;
use crate::status::style_tag;
use crate::types::{CountRow, DashboardSummary, FleetRecord, VehicleRow};
use crate::util::{format_int, format_percent, or_dash};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn vehicle_row(r: &FleetRecord) -> VehicleRow {
    VehicleRow {
        plate: or_dash(r.plate.as_deref()),
        status: r.status.clone(),
        vehicle_type: or_dash(r.vehicle_type.as_deref()),
        current_position: or_dash(r.current_position.as_deref()),
        origin_region: or_dash(r.origin_region.as_deref()),
        final_destination: or_dash(r.final_destination.as_deref()),
        destination_region: or_dash(r.destination_region.as_deref()),
        driver: or_dash(r.driver.as_deref()),
        style: style_tag(&r.status).as_str().to_string(),
    }
}

pub fn vehicle_rows(records: &[&FleetRecord]) -> Vec<VehicleRow> {
    records.iter().map(|r| vehicle_row(r)).collect()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}", table_str);
    if rows.len() > max_rows {
        println!("... {} more row(s)", format_int(rows.len() - max_rows));
    }
    println!();
}

fn count_panel(title: &str, rows: &[CountRow], max_rows: usize) {
    println!("{}", title);
    preview_table_rows(rows, max_rows);
}

/// Header line with the availability rate and load details.
pub fn print_header(file_name: Option<&str>, loaded_at: Option<&str>, availability: f64) {
    println!("================ TORRE DE CONTROLE | FROTA AGRO ================");
    if let Some(f) = file_name {
        print!("Source: {}", f);
        if let Some(t) = loaded_at {
            print!("  (loaded {})", t);
        }
        println!();
    }
    println!("Availability: {}\n", format_percent(availability));
}

pub fn print_dashboard(summary: &DashboardSummary, records: &[&FleetRecord], cfg: &DisplayConfig) {
    preview_table_rows(&summary.kpis.rows(), 4);
    count_panel("STATUS DA FROTA", &summary.status_table, cfg.preview_rows);
    count_panel("POSIÇÃO ATUAL", &summary.position_table, cfg.preview_rows);
    count_panel("TIPO DE VEÍCULO", &summary.type_table, cfg.preview_rows);
    if let Some(origin) = &summary.origin_table {
        if !origin.is_empty() {
            count_panel("DISTRIBUIÇÃO POR UF (ORIGEM)", origin, cfg.preview_rows);
        }
    }
    println!("DETALHAMENTO COMPLETO DA FROTA");
    preview_table_rows(&vehicle_rows(records), cfg.preview_rows);
}
