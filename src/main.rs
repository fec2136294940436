// Entry point and interactive menu.
//
// - Option [1] loads the fleet sheet (xlsx or csv export) into the session.
// - Options [2]-[5] work on the loaded dataset: dashboard, filters, status
//   scope and the KPI drill-down.
// - Option [6] exports the current view, option [7] re-reads the upload
//   without the parse cache.
use fleet_tower::config::AppConfig;
use fleet_tower::drilldown::{self, DrillDown};
use fleet_tower::filter::Dimension;
use fleet_tower::output;
use fleet_tower::session::Session;
use fleet_tower::status::{KpiBucket, StatusScope};
use fleet_tower::util::format_int;
use fleet_tower::{logging, FleetError};
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::error;

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    read_line("Enter choice: ")
}

/// Ask for a 1-based index into a list of `len` entries.
fn read_index(prompt: &str, len: usize) -> Option<usize> {
    match read_line(prompt).parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Some(n - 1),
        _ => None,
    }
}

fn report_error(e: &FleetError) {
    if e.is_ingestion() {
        eprintln!("Could not load the fleet sheet: {}\n", e);
    } else {
        eprintln!("Error: {}\n", e);
    }
    error!(error = %e, "operation failed");
}

fn print_load_summary(session: &Session) {
    let Some(rep) = session.report() else {
        return;
    };
    println!(
        "Fleet sheet loaded: {} rows read, {} kept.",
        format_int(rep.total_rows),
        format_int(rep.kept_rows)
    );
    if rep.dropped_missing_status > 0 {
        println!(
            "Note: {} rows skipped for missing STATUS.",
            format_int(rep.dropped_missing_status)
        );
    }
    if let Some(n) = rep.ambiguous_region_columns {
        println!(
            "Warning: found {} UF columns; expected exactly two (origin, destination). \
             Region fields were not assigned.",
            n
        );
    }
    println!();
}

fn handle_load(session: &mut Session, cfg: &AppConfig) {
    let default = cfg.source.input_path.display().to_string();
    let answer = read_line(&format!("Fleet file [{}]: ", default));
    let path = if answer.is_empty() {
        cfg.source.input_path.clone()
    } else {
        PathBuf::from(answer)
    };
    match session.load_path(&path).map(|_| ()) {
        Ok(()) => print_load_summary(session),
        Err(e) => report_error(&e),
    }
}

fn handle_dashboard(session: &Session, cfg: &AppConfig) {
    let Some(view) = session.view() else {
        println!("Please load a fleet file first (option 1).\n");
        return;
    };
    let loaded_at = session
        .loaded_at()
        .map(|t| t.format("%d/%m/%Y %H:%M").to_string());
    output::print_header(
        session.file_name(),
        loaded_at.as_deref(),
        view.summary.availability_rate,
    );
    output::print_dashboard(&view.summary, &view.records, &cfg.display);
}

fn parse_picks(input: &str, options: &[String]) -> Option<BTreeSet<String>> {
    match input.to_ascii_lowercase().as_str() {
        "all" | "" => return Some(options.iter().cloned().collect()),
        "none" => return Some(BTreeSet::new()),
        _ => {}
    }
    input
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=options.len()).contains(n))
                .map(|n| options[n - 1].clone())
        })
        .collect()
}

fn handle_filters(session: &mut Session) {
    if session.dataset().is_none() {
        println!("Please load a fleet file first (option 1).\n");
        return;
    }
    let options = session.options();
    let has_origin = session.dataset().is_some_and(|d| d.has_origin_region());
    let dims: Vec<Dimension> = Dimension::ALL
        .into_iter()
        .filter(|d| *d != Dimension::OriginRegion || has_origin)
        .collect();
    for (i, d) in dims.iter().enumerate() {
        println!(
            "[{}] {} ({} of {} selected)",
            i + 1,
            d.label(),
            session.selection().get(*d).len(),
            options.get(*d).len()
        );
    }
    let Some(idx) = read_index("Filter to edit: ", dims.len()) else {
        println!("Invalid choice.\n");
        return;
    };
    let dim = dims[idx];
    let offered = options.get(dim);
    for (i, v) in offered.iter().enumerate() {
        let mark = if session.selection().get(dim).contains(v) { "x" } else { " " };
        println!("  [{}] {:>3}. {}", mark, i + 1, v);
    }
    let answer = read_line("Numbers separated by commas, 'all' or 'none': ");
    match parse_picks(&answer, offered) {
        Some(values) => {
            session.set_selection(dim, values);
            println!("{} filter updated.\n", dim.label());
        }
        None => println!("Invalid selection; filter unchanged.\n"),
    }
}

fn handle_scope(session: &mut Session) {
    let next = session.scope().toggled();
    session.set_scope(next);
    match next {
        StatusScope::All => println!("Including ALL statuses. Filters were reset.\n"),
        StatusScope::Core => println!("Showing operational statuses only. Filters were reset.\n"),
    }
}

fn handle_drilldown(session: &Session, cfg: &AppConfig) {
    let Some(view) = session.view() else {
        println!("Please load a fleet file first (option 1).\n");
        return;
    };
    for (i, b) in KpiBucket::ALL.iter().enumerate() {
        println!("[{}] {} ({})", i + 1, b, view.summary.kpis.get(*b));
    }
    let Some(idx) = read_index("KPI: ", KpiBucket::ALL.len()) else {
        println!("Invalid choice.\n");
        return;
    };
    let mut dd = DrillDown::new(KpiBucket::ALL[idx]);
    let members = drilldown::members(&view.records, dd.bucket);
    println!("\n{}: {} vehicle(s)", dd.bucket, format_int(members.len()));
    if members.is_empty() {
        println!("No vehicles in this category.\n");
        return;
    }

    let breakdown = drilldown::status_breakdown(&members);
    if !breakdown.is_empty() {
        output::preview_table_rows(&breakdown, breakdown.len());
    }

    let choices = drilldown::status_choices(&members);
    println!("[0] TODOS");
    for (i, s) in choices.iter().enumerate() {
        println!("[{}] {}", i + 1, s);
    }
    dd.status = read_index("Status [0]: ", choices.len()).map(|i| choices[i].clone());
    dd.query = read_line("Quick search (plate, driver, position, destination...): ");

    let shown = drilldown::apply(&view.records, &dd);
    println!("Showing {} vehicle(s)", format_int(shown.len()));
    output::preview_table_rows(&output::vehicle_rows(&shown), cfg.display.preview_rows);
}

fn handle_export(session: &Session, cfg: &AppConfig) {
    let Some(view) = session.view() else {
        println!("Please load a fleet file first (option 1).\n");
        return;
    };
    let dir = &cfg.display.export_dir;
    let vehicles = dir.join("frota_filtrada.csv");
    let summary = dir.join("resumo_frota.json");
    let result = output::write_csv(&vehicles, &output::vehicle_rows(&view.records))
        .and_then(|_| output::write_json(&summary, &view.summary));
    match result {
        Ok(()) => println!(
            "Exported {} and {}\n",
            vehicles.display(),
            summary.display()
        ),
        Err(e) => report_error(&e),
    }
}

fn handle_refresh(session: &mut Session) {
    match session.refresh().map(|r| r.is_some()) {
        Ok(true) => {
            println!("Data reloaded.");
            print_load_summary(session);
        }
        Ok(false) => println!("Nothing to refresh; load a fleet file first.\n"),
        Err(e) => report_error(&e),
    }
}

fn main() {
    logging::init();
    let cfg = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}; using defaults.", e);
            AppConfig::default()
        }
    };
    let mut session = Session::new(cfg.source.clone());

    loop {
        let scope = match session.scope() {
            StatusScope::Core => "operational only",
            StatusScope::All => "all",
        };
        println!("TORRE DE CONTROLE | FROTA AGRO");
        println!("[1] Load fleet file");
        println!("[2] Show dashboard");
        println!("[3] Edit filters");
        println!("[4] Toggle status scope (current: {})", scope);
        println!("[5] KPI drill-down");
        println!("[6] Export current view");
        println!("[7] Refresh data");
        println!("[0] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(&mut session, &cfg),
            "2" => handle_dashboard(&session, &cfg),
            "3" => handle_filters(&mut session),
            "4" => handle_scope(&mut session),
            "5" => handle_drilldown(&session, &cfg),
            "6" => handle_export(&session, &cfg),
            "7" => handle_refresh(&mut session),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter a number from 0 to 7.\n"),
        }
    }
}
