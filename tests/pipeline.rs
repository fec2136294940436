use fleet_tower::config::SourceConfig;
use fleet_tower::filter::{self, Dimension, FilterOptions, FilterSelection};
use fleet_tower::loader::normalize;
use fleet_tower::reports::summarize;
use fleet_tower::session::Session;
use fleet_tower::status::{StatusScope, AVAILABLE_CREWED, LOADED, ORDERED_STATUSES};
use fleet_tower::types::{Cell, FleetRecord, RawTable};
use fleet_tower::FleetError;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::io::Write;

const HEADER: [&str; 6] = ["PLACA", "STATUS", "TIPO", "POSIÇÃO ATUAL", "UF", "UF"];

fn status_pool() -> Vec<String> {
    let mut v: Vec<String> = ORDERED_STATUSES.iter().map(|s| s.to_string()).collect();
    v.push("EM VIAGEM".to_string());
    v
}

fn messy(value: &str, lower: bool, pad: bool) -> String {
    let v = if lower { value.to_lowercase() } else { value.to_string() };
    if pad {
        format!("  {} ", v)
    } else {
        v
    }
}

/// Status cell: a taxonomy status with noise, or a blank-like token.
fn status_cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        4 => (0..status_pool().len(), any::<bool>(), any::<bool>())
            .prop_map(|(i, lower, pad)| Cell::text(messy(&status_pool()[i], lower, pad))),
        1 => prop_oneof![
            Just(Cell::Empty),
            Just(Cell::text("")),
            Just(Cell::text("   ")),
            Just(Cell::text("nan")),
            Just(Cell::text("NaN")),
        ],
    ]
}

fn choice_cell(pool: &'static [&'static str]) -> impl Strategy<Value = Cell> {
    prop_oneof![
        5 => (0..pool.len(), any::<bool>()).prop_map(move |(i, lower)| Cell::text(messy(pool[i], lower, false))),
        1 => Just(Cell::Empty),
    ]
}

const TYPES: &[&str] = &["CAM", "BI-TRUCK", "TOCO", "CARRETA"];
const POSITIONS: &[&str] = &["PÁTIO", "OFICINA", "CLIENTE"];
const REGIONS: &[&str] = &["SP", "MG", "GO", "MT"];

fn raw_table() -> impl Strategy<Value = RawTable> {
    prop::collection::vec(
        (
            status_cell(),
            choice_cell(TYPES),
            choice_cell(POSITIONS),
            choice_cell(REGIONS),
            choice_cell(REGIONS),
        ),
        0..40,
    )
    .prop_map(|rows| {
        let mut out: Vec<Vec<Cell>> = vec![HEADER.iter().map(|h| Cell::text(*h)).collect()];
        for (i, (status, kind, pos, origin, dest)) in rows.into_iter().enumerate() {
            out.push(vec![Cell::text(format!("P{:04}", i)), status, kind, pos, origin, dest]);
        }
        RawTable::new(out)
    })
}

fn plates(records: &[&FleetRecord]) -> HashSet<String> {
    records.iter().filter_map(|r| r.plate.clone()).collect()
}

fn subset(values: &[String], mask: &[bool]) -> BTreeSet<String> {
    values
        .iter()
        .zip(mask.iter().chain(std::iter::repeat(&false)))
        .filter(|(_, keep)| **keep)
        .map(|(v, _)| v.clone())
        .collect()
}

proptest! {
    #[test]
    fn normalized_records_always_have_status(raw in raw_table()) {
        match normalize(&raw) {
            Ok((ds, rep)) => {
                prop_assert_eq!(rep.kept_rows + rep.dropped_missing_status, rep.total_rows);
                for r in &ds.records {
                    prop_assert!(!r.status.is_empty());
                    prop_assert_eq!(r.status.trim(), r.status.as_str());
                    prop_assert_eq!(r.status.to_uppercase(), r.status.clone());
                    prop_assert_ne!(r.status.as_str(), "NAN");
                }
            }
            Err(FleetError::EmptyDataset(_)) => {}
            Err(e) => prop_assert!(false, "unexpected error: {}", e),
        }
    }

    #[test]
    fn normalization_is_a_fixed_point(raw in raw_table()) {
        if let Ok((first, _)) = normalize(&raw) {
            let (second, _) = normalize(&first.to_raw_table()).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn widening_a_selection_never_drops_records(
        raw in raw_table(),
        narrow_mask in prop::collection::vec(any::<bool>(), 24),
        extra_mask in prop::collection::vec(any::<bool>(), 24),
        all_scope in any::<bool>(),
    ) {
        let Ok((ds, _)) = normalize(&raw) else { return Ok(()); };
        let scope = if all_scope { StatusScope::All } else { StatusScope::Core };
        let base = filter::restrict_to_scope(&ds, scope);
        let opts = FilterOptions::from_records(&base, true);

        let mut narrow = FilterSelection::default();
        let mut wide = FilterSelection::default();
        for (k, dim) in Dimension::ALL.into_iter().enumerate() {
            let values = opts.get(dim);
            let n = subset(values, &narrow_mask[k * 6..]);
            let mut w = n.clone();
            w.extend(subset(values, &extra_mask[k * 6..]));
            // An empty origin set means "no constraint", so it can only be
            // widened by staying empty.
            if dim == Dimension::OriginRegion && n.is_empty() {
                w.clear();
            }
            narrow.set(dim, n);
            wide.set(dim, w);
        }

        let small = plates(&filter::apply(&base, &narrow, true));
        let large = plates(&filter::apply(&base, &wide, true));
        prop_assert!(small.is_subset(&large));
    }

    #[test]
    fn aggregates_are_consistent(raw in raw_table(), all_scope in any::<bool>()) {
        let Ok((ds, _)) = normalize(&raw) else { return Ok(()); };
        let scope = if all_scope { StatusScope::All } else { StatusScope::Core };
        let base = filter::restrict_to_scope(&ds, scope);
        let s = summarize(&base, ds.has_origin_region());

        let status_sum: usize = s.status_table.iter().map(|r| r.count).sum();
        prop_assert_eq!(status_sum, base.len());
        prop_assert!(s.status_table.iter().all(|r| r.count > 0));
        prop_assert!(s.kpis.in_operation + s.kpis.available + s.kpis.maintenance <= s.kpis.total);
        prop_assert!((0.0..=100.0).contains(&s.availability_rate));
        if base.is_empty() {
            prop_assert_eq!(s.availability_rate, 0.0);
        }
        for t in [&s.type_table, &s.position_table] {
            prop_assert!(t.windows(2).all(|w| w[0].count >= w[1].count));
        }
    }
}

#[test]
fn loaded_versus_available_filter() {
    let raw = RawTable::new(vec![
        vec![Cell::text("STATUS"), Cell::text("TIPO"), Cell::text("POSIÇÃO ATUAL")],
        vec![Cell::text("carregado"), Cell::text("cam"), Cell::text("pátio")],
        vec![Cell::text("disponíveis tripulado"), Cell::text("cam"), Cell::text("pátio")],
    ]);
    let (ds, _) = normalize(&raw).unwrap();
    let base = filter::restrict_to_scope(&ds, StatusScope::Core);
    let mut sel = FilterSelection::all_of(&FilterOptions::from_records(&base, false));
    assert!(sel.statuses.contains(AVAILABLE_CREWED));
    sel.set(Dimension::Status, BTreeSet::from([LOADED.to_string()]));
    let out = filter::apply(&base, &sel, ds.has_origin_region());
    let s = summarize(&out, ds.has_origin_region());
    assert_eq!(out.len(), 1);
    assert_eq!(s.kpis.in_operation, 1);
    assert_eq!(s.kpis.available, 0);
}

#[test]
fn third_uf_column_yields_no_region_fields() {
    let labels = [
        "PLACA", "STATUS", "TIPO", "UF", "A", "B", "C", "UF", "D", "UF",
    ];
    let mut row: Vec<Cell> = labels.iter().map(|_| Cell::text("x")).collect();
    row[1] = Cell::text("carregado");
    let raw = RawTable::new(vec![labels.iter().map(|l| Cell::text(*l)).collect(), row]);
    let (ds, rep) = normalize(&raw).unwrap();
    assert_eq!(ds.columns[9], "UF_2");
    assert!(!ds.has_origin_region());
    assert_eq!(ds.records[0].origin_region, None);
    assert_eq!(rep.ambiguous_region_columns, Some(3));
}

#[test]
fn session_loads_csv_from_disk() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(
        file,
        "FROTA AGRO - POSIÇÃO DIÁRIA\n\
         PLACA,STATUS,TIPO,POSIÇÃO ATUAL,UF,MOTORISTA,UF,DESTINO FINAL\n\
         abc1d23, manutenção ,cam,oficina,sp,josé,mg,uberaba\n\
         def4g56,carregado,bi-truck,cliente,go,ana,sp,santos\n\
         ghi7j89,,toco,pátio,sp,,,\n"
    )
    .unwrap();

    let mut session = Session::new(SourceConfig::default());
    let rep = session.load_path(file.path()).unwrap();
    assert_eq!(rep.total_rows, 3);
    assert_eq!(rep.kept_rows, 2);

    let view = session.view().unwrap();
    assert_eq!(view.summary.kpis.total, 2);
    assert_eq!(view.summary.kpis.maintenance, 1);
    assert_eq!(view.summary.kpis.in_operation, 1);
    assert!((view.summary.availability_rate - 50.0).abs() < 1e-9);
    let origins = view.summary.origin_table.clone().unwrap();
    assert_eq!(origins.len(), 2);
    let m = view
        .records
        .iter()
        .find(|r| r.status == "MANUTENÇÃO")
        .unwrap();
    assert_eq!(m.driver.as_deref(), Some("JOSÉ"));
    assert_eq!(m.destination_region.as_deref(), Some("MG"));
    assert_eq!(m.final_destination.as_deref(), Some("UBERABA"));
}

#[test]
fn unreadable_path_is_malformed() {
    let mut session = Session::new(SourceConfig::default());
    let err = session
        .load_path(std::path::Path::new("/no/such/frota.xlsx"))
        .unwrap_err();
    assert!(matches!(err, FleetError::MalformedSpreadsheet(_)));
    assert!(session.view().is_none());
}
